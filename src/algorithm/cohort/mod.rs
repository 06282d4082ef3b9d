//! Cohort definition and assembly
//!
//! A dataset definition pairs an eligibility rule with an ordered list of
//! feature specifications; the assembler evaluates it per patient into
//! feature rows. Definitions are built once from the study configuration
//! and never mutated afterwards.

pub mod assembler;
pub mod categories;
pub mod eligibility;
pub mod features;

pub use assembler::CohortAssembler;
pub use categories::derive_category;
pub use eligibility::{
    AnchorRequirement, AnchorRule, EligibilityRule, ExclusionHorizon, ExclusionRule,
    RegistrationReference,
};
pub use features::{AgeReference, AnchorSource, FeatureSpec, exposure_flag_grid};

use rustc_hash::FxHashSet;

use crate::error::{CohortError, Result};

/// A declarative dataset: population rule plus output columns
#[derive(Debug, Clone)]
pub struct DatasetDefinition {
    /// Name of the dataset, used for logging and output files
    pub name: String,
    /// Population eligibility predicate
    pub eligibility: EligibilityRule,
    /// Output columns in emission order
    pub features: Vec<FeatureSpec>,
}

impl DatasetDefinition {
    /// Create a definition with no feature columns yet
    #[must_use]
    pub fn new(name: impl Into<String>, eligibility: EligibilityRule) -> Self {
        Self {
            name: name.into(),
            eligibility,
            features: Vec::new(),
        }
    }

    /// Append a feature column
    pub fn push_feature(&mut self, spec: FeatureSpec) {
        self.features.push(spec);
    }

    /// Append several feature columns
    pub fn extend_features(&mut self, specs: impl IntoIterator<Item = FeatureSpec>) {
        self.features.extend(specs);
    }

    /// Output column names in emission order
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.features.iter().map(FeatureSpec::name).collect()
    }

    /// Check the definition for duplicate column names
    pub fn validate(&self) -> Result<()> {
        let mut seen = FxHashSet::default();
        for spec in &self.features {
            if !seen.insert(spec.name()) {
                return Err(CohortError::configuration(format!(
                    "dataset `{}` declares column `{}` more than once",
                    self.name,
                    spec.name()
                )));
            }
        }
        Ok(())
    }
}
