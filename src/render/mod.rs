//! Terminal presentation of analysis results and errors.
//!
//! # Responsibilities
//! - Build a view model from an `AnalysisResult` (headline, rows, overlays)
//! - Show the "Normal Scan" empty state when no overlay came back
//! - Write decoded images to disk ("Download Results")

pub mod export;
pub mod view;

pub use export::{export_results, ExportError, ExportedFiles};
pub use view::{ErrorPanel, OverlaySection, PredictionRow, ResultsView, DISCLAIMER};
