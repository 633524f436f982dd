//! auroractl - declarative reconciliation of RDS Aurora resources
//!
//! Each invocation converges one named resource toward a desired-state
//! description: clusters and cluster instances are created, restored from
//! snapshot, modified, or deleted as needed, and cluster snapshots can be
//! searched with local filtering and sorting.
//!
//! ## Modules
//!
//! - `config`: desired-state configuration and pre-flight validation
//! - `reconcile`: the describe → diff → converge core
//! - `wait`: fixed-interval polling until a resource becomes available
//! - `snapshots`: the snapshot query surface
//! - `aws`: the RDS gateway and shared SDK plumbing

pub mod aws;
pub mod config;
pub mod reconcile;
pub mod snapshots;
pub mod wait;
