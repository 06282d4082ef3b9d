//! Case-control matching
//!
//! Consumes two derived feature tables (cases and potential controls) and
//! pairs each case with N controls by stratified nearest-neighbour matching
//! on a declared set of variables.

pub mod control_data;
pub mod criteria;
pub mod extraction;
pub mod matcher;
pub mod types;

pub use criteria::{MatchVariable, MatchingConfig};
pub use matcher::Matcher;
pub use types::{MatchedSet, MatchingReport, MatchingResult};
