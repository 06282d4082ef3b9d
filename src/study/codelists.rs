//! Code lists used by the antibiotic safety study
//!
//! One table of named CSV sources, loaded once per run into a registry,
//! plus the unions the definitions share. Keys are stable strings so the
//! definitions and the dummy-data generator refer to the same lists.

use log::info;
use std::path::Path;

use crate::codelist::{CodeList, CodeListRegistry};
use crate::error::Result;

/// Registry keys for the study's code lists
pub mod keys {
    /// Oral amoxicillin dm+d codes
    pub const AMOXICILLIN: &str = "amoxicillin";
    /// Oral co-amoxiclav dm+d codes
    pub const CO_AMOXICLAV: &str = "amoxicillin_clavulanic_acid";
    /// Oral cefalexin dm+d codes
    pub const CEFALEXIN: &str = "cefalexin";
    /// Trimethoprim dm+d codes
    pub const TRIMETHOPRIM: &str = "trimethoprim";
    /// Trimethoprim-sulfamethoxazole dm+d codes
    pub const TRIMETHOPRIM_SULFAMETHOXAZOLE: &str = "trimethoprim_sulfamethoxazole";
    /// Fluoroquinolone dm+d codes
    pub const FLUOROQUINOLONES: &str = "fluoroquinolones";
    /// Union of all study antibiotics
    pub const ALL_ANTIBIOTICS: &str = "all_antibiotics";
    /// Tendinitis SNOMED CT codes
    pub const TENDINITIS: &str = "tendinitis";
    /// Peripheral neuropathy SNOMED CT codes
    pub const PERIPHERAL_NEUROPATHY: &str = "peripheral_neuropathy";
    /// Union of both outcome lists
    pub const COMBO_OUTCOME: &str = "combo_outcome";
    /// Smoking status codes mapped to S/E/N categories
    pub const SMOKING: &str = "smoking";
    /// Ethnicity codes mapped to category labels
    pub const ETHNICITY: &str = "ethnicity";
}

/// The study's antibiotic registry keys, in output column order
pub const ANTIBIOTIC_KEYS: [&str; 6] = [
    keys::AMOXICILLIN,
    keys::CO_AMOXICLAV,
    keys::CEFALEXIN,
    keys::TRIMETHOPRIM,
    keys::TRIMETHOPRIM_SULFAMETHOXAZOLE,
    keys::FLUOROQUINOLONES,
];

/// Plain (key, file) sources with a `code` column
const PLAIN_SOURCES: [(&str, &str); 8] = [
    (keys::AMOXICILLIN, "amoxicillin-oral.csv"),
    (keys::CO_AMOXICLAV, "co-amoxiclav-oral.csv"),
    (keys::CEFALEXIN, "cefalexin-oral.csv"),
    (keys::TRIMETHOPRIM, "trimethoprim.csv"),
    (
        keys::TRIMETHOPRIM_SULFAMETHOXAZOLE,
        "trimethoprim-sulfamethoxazole.csv",
    ),
    (keys::FLUOROQUINOLONES, "fluoroquinolones.csv"),
    (keys::TENDINITIS, "tendinitis.csv"),
    (keys::PERIPHERAL_NEUROPATHY, "peripheral-neuropathy.csv"),
];

/// Categorised (key, file) sources with `code` and `category` columns
const CATEGORISED_SOURCES: [(&str, &str); 2] = [
    (keys::SMOKING, "smoking-status.csv"),
    (keys::ETHNICITY, "ethnicity.csv"),
];

/// Load every study code list from `dir` into a fresh registry
///
/// Any unreadable source or missing column aborts the run here, before any
/// patient data is touched.
pub fn load_study_codelists(dir: &Path) -> Result<CodeListRegistry> {
    let mut registry = CodeListRegistry::new();

    for (key, file) in PLAIN_SOURCES {
        registry.insert(CodeList::from_csv(key, dir.join(file), "code")?);
    }
    for (key, file) in CATEGORISED_SOURCES {
        registry.insert(CodeList::from_csv_with_categories(
            key,
            dir.join(file),
            "code",
            "category",
        )?);
    }

    registry.insert_union(keys::ALL_ANTIBIOTICS, &ANTIBIOTIC_KEYS)?;
    registry.insert_union(
        keys::COMBO_OUTCOME,
        &[keys::TENDINITIS, keys::PERIPHERAL_NEUROPATHY],
    )?;

    info!(
        "Loaded {} code lists from {}",
        registry.len(),
        dir.display()
    );
    Ok(registry)
}
