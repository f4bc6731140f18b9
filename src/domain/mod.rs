//! Domain logic - pure value types and the reconciliation decision,
//! independent of git and of the manifest format

pub mod marker;
pub mod plan;
pub mod version;

pub use marker::Marker;
pub use plan::{decide, ActionPlan, Scenario};
pub use version::{compare, increment, VersionIdentifier};
