//! Algorithm implementations for study derivation workflows
//!
//! This module contains the derivation core: index-date resolution, window
//! filtering, cohort assembly, case-control matching, and interval-based
//! measures.

pub mod anchor;
pub mod cohort;
pub mod matching;
pub mod measures;
pub mod window;
