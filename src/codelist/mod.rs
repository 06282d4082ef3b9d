//! Clinical code lists and the registry that owns them
//!
//! A code list is a named, immutable set of clinical or drug codes with an
//! optional code-to-category mapping (used for covariates such as smoking
//! status or ethnicity). Lists are loaded from CSV sources once per run and
//! shared read-only across the pipeline.

mod loader;

use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{CohortError, Result};

/// Errors raised while loading or combining code lists
///
/// All of these are fatal configuration failures: the run aborts before any
/// patient is processed.
#[derive(Debug, thiserror::Error)]
pub enum CodelistError {
    /// The source file could not be opened or parsed
    #[error("failed to read code list {path}: {source}")]
    Unreadable {
        /// Path of the offending source
        path: PathBuf,
        /// Underlying CSV/IO error
        #[source]
        source: csv::Error,
    },
    /// The named column is absent from the source
    #[error("code list {path} has no column named `{column}`")]
    MissingColumn {
        /// Path of the offending source
        path: PathBuf,
        /// The column that was requested
        column: String,
    },
    /// The source contains no codes
    #[error("code list {path} contains no codes")]
    Empty {
        /// Path of the offending source
        path: PathBuf,
    },
    /// Two sources assign different categories to the same code
    #[error("conflicting categories for code `{code}`: `{left}` vs `{right}`")]
    CategoryConflict {
        /// The code carrying both categories
        code: String,
        /// Category from the earlier source
        left: String,
        /// Category from the later source
        right: String,
    },
}

/// A named, immutable set of codes with an optional category mapping
#[derive(Debug, Clone)]
pub struct CodeList {
    name: String,
    codes: FxHashSet<String>,
    categories: FxHashMap<String, String>,
}

impl CodeList {
    /// Create a list from bare codes
    pub fn new(name: impl Into<String>, codes: impl IntoIterator<Item = String>) -> Self {
        Self {
            name: name.into(),
            codes: codes.into_iter().collect(),
            categories: FxHashMap::default(),
        }
    }

    /// Create a list from (code, optional category) pairs
    ///
    /// Fails if the same code appears with two different categories.
    pub fn with_categories(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = (String, Option<String>)>,
    ) -> std::result::Result<Self, CodelistError> {
        let mut codes = FxHashSet::default();
        let mut categories: FxHashMap<String, String> = FxHashMap::default();
        for (code, category) in entries {
            if let Some(category) = category {
                if let Some(existing) = categories.get(&code) {
                    if *existing != category {
                        return Err(CodelistError::CategoryConflict {
                            code,
                            left: existing.clone(),
                            right: category,
                        });
                    }
                } else {
                    categories.insert(code.clone(), category);
                }
            }
            codes.insert(code);
        }
        Ok(Self {
            name: name.into(),
            codes,
            categories,
        })
    }

    /// Load a plain code list from a CSV source
    ///
    /// The `code_column` names the column holding the codes; loading fails
    /// if the source is unreadable or the column is absent.
    pub fn from_csv(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        code_column: &str,
    ) -> std::result::Result<Self, CodelistError> {
        let entries = loader::read_entries(path.as_ref(), code_column, None)?;
        Self::with_categories(name, entries)
    }

    /// Load a code list with a category column from a CSV source
    pub fn from_csv_with_categories(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        code_column: &str,
        category_column: &str,
    ) -> std::result::Result<Self, CodelistError> {
        let entries = loader::read_entries(path.as_ref(), code_column, Some(category_column))?;
        Self::with_categories(name, entries)
    }

    /// Union of several lists under a new name
    ///
    /// Codes are set-unioned. Category mappings must agree wherever the
    /// inputs overlap; a disagreement fails the whole operation.
    pub fn union(
        name: impl Into<String>,
        lists: &[&Self],
    ) -> std::result::Result<Self, CodelistError> {
        let entries = lists.iter().flat_map(|list| {
            list.codes.iter().map(|code| {
                (
                    code.clone(),
                    list.categories.get(code).cloned(),
                )
            })
        });
        Self::with_categories(name, entries)
    }

    /// The list's name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the list contains the given code
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    /// Category mapped to the given code, if any
    #[must_use]
    pub fn category_of(&self, code: &str) -> Option<&str> {
        self.categories.get(code).map(String::as_str)
    }

    /// Iterate over the codes (unordered)
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    /// Distinct categories appearing in the mapping (unordered)
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.values().map(String::as_str)
    }

    /// Number of codes in the list
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Owner of all code lists loaded for a run
///
/// Lists are registered once under a stable key during configuration and
/// handed out as shared references afterwards. Asking for an unregistered
/// key is a configuration error.
#[derive(Debug, Default)]
pub struct CodeListRegistry {
    lists: FxHashMap<String, Arc<CodeList>>,
}

impl CodeListRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a list under its own name
    pub fn insert(&mut self, list: CodeList) {
        self.lists.insert(list.name().to_string(), Arc::new(list));
    }

    /// Shared handle to a registered list
    pub fn get(&self, name: &str) -> Result<Arc<CodeList>> {
        self.lists.get(name).cloned().ok_or_else(|| {
            CohortError::configuration(format!("unknown code list `{name}`"))
        })
    }

    /// Register the union of already-registered lists under a new name
    pub fn insert_union(&mut self, name: &str, members: &[&str]) -> Result<()> {
        let lists: Vec<Arc<CodeList>> = members
            .iter()
            .map(|member| self.get(member))
            .collect::<Result<_>>()?;
        let refs: Vec<&CodeList> = lists.iter().map(Arc::as_ref).collect();
        let union = CodeList::union(name, &refs)?;
        self.insert(union);
        Ok(())
    }

    /// Number of registered lists
    #[must_use]
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}
