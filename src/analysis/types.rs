//! Prediction payload types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The five findings the model scores, in backend output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiseaseLabel {
    #[serde(rename = "Normal")]
    Normal,
    #[serde(rename = "COVID", alias = "COVID-19")]
    Covid19,
    #[serde(rename = "TB", alias = "Tuberculosis")]
    Tuberculosis,
    #[serde(rename = "Pneumonia")]
    Pneumonia,
    #[serde(rename = "Lung_Opacity", alias = "Lung Opacity")]
    LungOpacity,
}

impl DiseaseLabel {
    pub const ALL: [DiseaseLabel; 5] = [
        DiseaseLabel::Normal,
        DiseaseLabel::Covid19,
        DiseaseLabel::Tuberculosis,
        DiseaseLabel::Pneumonia,
        DiseaseLabel::LungOpacity,
    ];

    /// Human-facing name.
    pub fn display_name(self) -> &'static str {
        match self {
            DiseaseLabel::Normal => "Normal",
            DiseaseLabel::Covid19 => "COVID-19",
            DiseaseLabel::Tuberculosis => "Tuberculosis",
            DiseaseLabel::Pneumonia => "Pneumonia",
            DiseaseLabel::LungOpacity => "Lung Opacity",
        }
    }

    /// Lowercase identifier used in file names.
    pub fn slug(self) -> &'static str {
        match self {
            DiseaseLabel::Normal => "normal",
            DiseaseLabel::Covid19 => "covid19",
            DiseaseLabel::Tuberculosis => "tuberculosis",
            DiseaseLabel::Pneumonia => "pneumonia",
            DiseaseLabel::LungOpacity => "lung_opacity",
        }
    }
}

impl fmt::Display for DiseaseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Score for a single label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub disease: DiseaseLabel,
    /// Sigmoid probability in [0, 1].
    pub confidence: f64,
    pub detected: bool,
    /// CSS colour string, e.g. `rgb(255, 69, 96)`.
    pub color: String,
}

/// Grad-CAM overlay for one detected label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayImage {
    pub disease: DiseaseLabel,
    /// Data URI or plain URL.
    pub image: String,
    pub confidence: f64,
}

/// Body of a successful prediction response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub success: bool,
    pub predictions: Vec<Prediction>,
    pub detected_diseases: Vec<DiseaseLabel>,
    pub overlay_images: Vec<OverlayImage>,
    pub original_image: String,
    pub total_detections: u32,
}

/// A structural rule broken by a prediction body.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResultViolation {
    #[error("expected 5 predictions, got {0}")]
    PredictionCount(usize),

    #[error("prediction for {0} appears more than once")]
    DuplicateLabel(DiseaseLabel),

    #[error("confidence {confidence} for {label} is outside [0, 1]")]
    ConfidenceRange { label: DiseaseLabel, confidence: f64 },

    #[error("total_detections is {reported} but {actual} predictions are flagged detected")]
    DetectionCount { reported: u32, actual: u32 },
}

impl AnalysisResult {
    /// Number of predictions flagged as detected.
    pub fn detected_count(&self) -> u32 {
        self.predictions.iter().filter(|p| p.detected).count() as u32
    }

    /// Check the invariants the results view depends on.
    pub fn validate(&self) -> Result<(), ResultViolation> {
        if self.predictions.len() != DiseaseLabel::ALL.len() {
            return Err(ResultViolation::PredictionCount(self.predictions.len()));
        }

        let mut seen = Vec::with_capacity(DiseaseLabel::ALL.len());
        for prediction in &self.predictions {
            if seen.contains(&prediction.disease) {
                return Err(ResultViolation::DuplicateLabel(prediction.disease));
            }
            seen.push(prediction.disease);

            if !(0.0..=1.0).contains(&prediction.confidence) {
                return Err(ResultViolation::ConfidenceRange {
                    label: prediction.disease,
                    confidence: prediction.confidence,
                });
            }
        }

        let actual = self.detected_count();
        if self.total_detections != actual {
            return Err(ResultViolation::DetectionCount {
                reported: self.total_detections,
                actual,
            });
        }

        Ok(())
    }

    /// Prediction for a given label, if present.
    pub fn prediction(&self, label: DiseaseLabel) -> Option<&Prediction> {
        self.predictions.iter().find(|p| p.disease == label)
    }
}

/// Colour band used when showing a confidence value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Moderate,
    Low,
}

impl ConfidenceTier {
    pub fn of(confidence: f64) -> Self {
        if confidence >= 0.8 {
            ConfidenceTier::High
        } else if confidence >= 0.6 {
            ConfidenceTier::Moderate
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceTier::High => "high",
            ConfidenceTier::Moderate => "moderate",
            ConfidenceTier::Low => "low",
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn sample_body(detected: &[&str]) -> serde_json::Value {
        let labels = ["Normal", "COVID", "TB", "Pneumonia", "Lung_Opacity"];
        let predictions: Vec<_> = labels
            .iter()
            .map(|l| {
                let hit = detected.contains(l);
                json!({
                    "disease": l,
                    "confidence": if hit { 0.91 } else { 0.12 },
                    "detected": hit,
                    "color": "rgb(0, 200, 83)",
                })
            })
            .collect();
        let overlays: Vec<_> = detected
            .iter()
            .map(|l| json!({"disease": l, "image": "data:image/png;base64,iVBORw0K", "confidence": 0.91}))
            .collect();
        json!({
            "success": true,
            "predictions": predictions,
            "detected_diseases": detected,
            "overlay_images": overlays,
            "original_image": "data:image/png;base64,iVBORw0K",
            "total_detections": detected.len(),
        })
    }

    #[test]
    fn test_parse_backend_body() {
        let result: AnalysisResult =
            serde_json::from_value(sample_body(&["COVID", "Pneumonia"])).unwrap();
        assert!(result.validate().is_ok());
        assert_eq!(result.detected_count(), 2);
        assert_eq!(
            result.detected_diseases,
            vec![DiseaseLabel::Covid19, DiseaseLabel::Pneumonia]
        );
        assert!(result.prediction(DiseaseLabel::Covid19).unwrap().detected);
    }

    #[test]
    fn test_display_names_accepted() {
        let label: DiseaseLabel = serde_json::from_str("\"Lung Opacity\"").unwrap();
        assert_eq!(label, DiseaseLabel::LungOpacity);
        let label: DiseaseLabel = serde_json::from_str("\"Tuberculosis\"").unwrap();
        assert_eq!(label.to_string(), "Tuberculosis");
        assert!(serde_json::from_str::<DiseaseLabel>("\"Asthma\"").is_err());
    }

    #[test]
    fn test_detection_count_mismatch() {
        let mut body = sample_body(&["TB"]);
        body["total_detections"] = json!(3);
        let result: AnalysisResult = serde_json::from_value(body).unwrap();
        assert_eq!(
            result.validate(),
            Err(ResultViolation::DetectionCount { reported: 3, actual: 1 })
        );
    }

    #[test]
    fn test_wrong_prediction_count() {
        let mut body = sample_body(&[]);
        body["predictions"].as_array_mut().unwrap().pop();
        let result: AnalysisResult = serde_json::from_value(body).unwrap();
        assert_eq!(result.validate(), Err(ResultViolation::PredictionCount(4)));
    }

    #[test]
    fn test_duplicate_and_range() {
        let mut body = sample_body(&[]);
        body["predictions"][1]["disease"] = json!("Normal");
        let result: AnalysisResult = serde_json::from_value(body).unwrap();
        assert_eq!(
            result.validate(),
            Err(ResultViolation::DuplicateLabel(DiseaseLabel::Normal))
        );

        let mut body = sample_body(&[]);
        body["predictions"][4]["confidence"] = json!(1.5);
        let result: AnalysisResult = serde_json::from_value(body).unwrap();
        assert!(matches!(
            result.validate(),
            Err(ResultViolation::ConfidenceRange { label: DiseaseLabel::LungOpacity, .. })
        ));
    }

    #[test]
    fn test_confidence_tiers() {
        assert_eq!(ConfidenceTier::of(0.8), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::of(0.79), ConfidenceTier::Moderate);
        assert_eq!(ConfidenceTier::of(0.6), ConfidenceTier::Moderate);
        assert_eq!(ConfidenceTier::of(0.59), ConfidenceTier::Low);
    }
}
