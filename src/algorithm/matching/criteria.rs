//! Matching criteria definitions for case-control matching
//!
//! Matching variables are declared the way the study declares them: exact
//! agreement on a categorical column, or nearest-neighbour agreement within
//! a tolerance on a numeric column.

/// One declared matching variable
#[derive(Debug, Clone)]
pub enum MatchVariable {
    /// Exact agreement on a categorical column
    Category {
        /// Output column the values come from
        column: String,
    },
    /// Agreement within an absolute tolerance on a numeric column
    WithinTolerance {
        /// Output column the values come from
        column: String,
        /// Maximum allowed absolute difference
        tolerance: i64,
    },
}

impl MatchVariable {
    /// The column this variable reads
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::Category { column } | Self::WithinTolerance { column, .. } => column,
        }
    }
}

/// Configuration for the matching process
#[derive(Debug, Clone)]
pub struct MatchingConfig {
    /// Number of controls to match to each case
    pub matches_per_case: usize,
    /// Declared matching variables
    pub variables: Vec<MatchVariable>,
    /// Case column carrying the index date copied onto each matched set
    pub index_date_column: String,
    /// Optional random seed for reproducible tie-breaks
    pub random_seed: Option<u64>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            matches_per_case: 3,
            variables: vec![
                MatchVariable::Category {
                    column: "sex".to_string(),
                },
                MatchVariable::WithinTolerance {
                    column: "age".to_string(),
                    tolerance: 5,
                },
            ],
            index_date_column: "potential_case_date".to_string(),
            random_seed: None,
        }
    }
}

impl MatchingConfig {
    /// Create a configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns of the declared category variables, in declaration order
    pub fn category_columns(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().filter_map(|variable| match variable {
            MatchVariable::Category { column } => Some(column.as_str()),
            MatchVariable::WithinTolerance { .. } => None,
        })
    }

    /// (column, tolerance) pairs of the numeric variables, in declaration order
    pub fn tolerance_columns(&self) -> impl Iterator<Item = (&str, i64)> {
        self.variables.iter().filter_map(|variable| match variable {
            MatchVariable::WithinTolerance { column, tolerance } => {
                Some((column.as_str(), *tolerance))
            }
            MatchVariable::Category { .. } => None,
        })
    }
}
