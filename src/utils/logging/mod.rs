//! Logging utilities for output and progress tracking

pub mod progress;

pub use progress::create_main_progress_bar;
