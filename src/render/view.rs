//! Results and error views.

use std::fmt;

use crate::analysis::{AnalysisResult, ConfidenceTier, DiseaseLabel};
use crate::session::ErrorView;

/// Research-use notice shown under every result.
pub const DISCLAIMER: &str = "This AI analysis is for research and educational purposes only. \
It should not replace professional medical diagnosis. Please consult a qualified radiologist \
or healthcare professional for clinical decision-making.";

/// One line of the detection summary.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRow {
    pub label: DiseaseLabel,
    pub detected: bool,
    /// Percentage with one decimal, e.g. `"91.0%"`.
    pub percent: String,
    pub tier: ConfidenceTier,
    pub color: String,
}

/// Overlay area: either the per-disease list or the empty state.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlaySection {
    Overlays(Vec<(DiseaseLabel, String)>),
    NormalScan,
}

/// Everything the results screen shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub headline: String,
    pub total_detections: u32,
    pub rows: Vec<PredictionRow>,
    pub overlays: OverlaySection,
}

fn percent(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

impl ResultsView {
    pub fn new(result: &AnalysisResult) -> Self {
        let total = result.total_detections;
        let headline = match total {
            0 => "No abnormalities detected - appears normal".to_string(),
            1 => "1 condition detected".to_string(),
            n => format!("{} conditions detected", n),
        };

        let rows = result
            .predictions
            .iter()
            .map(|p| PredictionRow {
                label: p.disease,
                detected: p.detected,
                percent: percent(p.confidence),
                tier: ConfidenceTier::of(p.confidence),
                color: p.color.clone(),
            })
            .collect();

        let overlays = if result.overlay_images.is_empty() {
            OverlaySection::NormalScan
        } else {
            OverlaySection::Overlays(
                result
                    .overlay_images
                    .iter()
                    .map(|o| (o.disease, percent(o.confidence)))
                    .collect(),
            )
        };

        Self {
            headline,
            total_detections: total,
            rows,
            overlays,
        }
    }
}

impl From<&AnalysisResult> for ResultsView {
    fn from(result: &AnalysisResult) -> Self {
        ResultsView::new(result)
    }
}

impl fmt::Display for ResultsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis Complete")?;
        writeln!(f, "Diagnostic Results: {}", self.headline)?;
        writeln!(f)?;

        for row in &self.rows {
            let mark = if row.detected { "[x]" } else { "[ ]" };
            writeln!(
                f,
                "  {} {:<14} {:>6}  ({} confidence)",
                mark,
                row.label.display_name(),
                row.percent,
                row.tier.as_str()
            )?;
        }
        writeln!(f)?;

        match &self.overlays {
            OverlaySection::Overlays(items) => {
                writeln!(f, "AI Analysis Overlay:")?;
                for (label, pct) in items {
                    writeln!(f, "  - {} ({})", label, pct)?;
                }
            }
            OverlaySection::NormalScan => {
                writeln!(f, "Normal Scan")?;
                writeln!(
                    f,
                    "  No abnormalities detected in the chest X-ray. The lung tissue appears healthy."
                )?;
            }
        }
        writeln!(f)?;
        write!(f, "Important Notice: {}", DISCLAIMER)
    }
}

/// Error box shown above the upload area.
pub struct ErrorPanel<'a>(pub &'a ErrorView);

impl fmt::Display for ErrorPanel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Analysis Error: {}", self.0.message)?;
        if let Some(hint) = self.0.setup_hint {
            write!(f, "\n{}", hint)?;
        }
        Ok(())
    }
}
