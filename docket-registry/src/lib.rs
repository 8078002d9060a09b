//! DOCKET Registry - Submission Intake and Form Lifecycle
//!
//! Three tightly coupled pieces: the jurisdiction directory (normalizes
//! descriptors into canonical arena records), the duplicate detector
//! (content hash, title similarity, form number), and the form lifecycle
//! manager (submission through terminal review decisions, with reward
//! accounting invoked synchronously on approval).

pub mod directory;
pub mod duplicate;
pub mod lifecycle;

pub use directory::JurisdictionDirectory;
pub use duplicate::DuplicateDetector;
pub use lifecycle::{FormLifecycle, ReviewAction, ReviewOutcome};
