// Media Forensics Fusion - five diagnostic layers, one fused verdict
//
// Camera metadata present: trust it (95) unless AI confidence > 98 (spoofed, 10)
// Camera metadata absent: AI confidence bands >80 / 50-80 / <50

use super::{CredibilityScore, FusionPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

pub const VERDICT_AUTHENTIC: &str = "Authentic";
pub const VERDICT_METADATA_SPOOFED: &str = "Metadata Spoofed";
pub const VERDICT_AI_GENERATED: &str = "AI Generated";
pub const VERDICT_SUSPICIOUS: &str = "Suspicious";
pub const VERDICT_WEB_AUTHENTIC: &str = "Web / Authentic";
pub const LABEL_NO_AI_PATTERN: &str = "No AI Pattern";

const TAG_MAKE: &str = "Make";
const TAG_MODEL: &str = "Model";
const TAG_CAPTURE_TIME: &str = "DateTimeOriginal";

/// Signals gathered for one uploaded image
#[derive(Debug, Clone, Default)]
pub struct ImageSignals {
    /// SHA-256 of the raw upload
    pub hash: String,
    /// Embedded metadata, tag name → display value
    pub metadata: BTreeMap<String, String>,
    /// Variance of the edge-intensity histogram
    pub noise_variance: Option<f64>,
    /// Synthetic-image confidence 0-100; None when no classifier answered
    pub ai_confidence: Option<f64>,
}

impl ImageSignals {
    fn tag(&self, name: &str) -> Option<&str> {
        self.metadata
            .get(name)
            .map(|v| v.trim().trim_matches('"').trim())
            .filter(|v| !v.is_empty())
    }

    /// Camera make/model, when either is present
    pub fn camera_attribution(&self) -> Option<String> {
        match (self.tag(TAG_MAKE), self.tag(TAG_MODEL)) {
            (None, None) => None,
            (Some(make), None) => Some(make.to_string()),
            (None, Some(model)) => Some(model.to_string()),
            (Some(make), Some(model)) => Some(format!("{} {}", make, model)),
        }
    }

    pub fn capture_time(&self) -> Option<&str> {
        self.tag(TAG_CAPTURE_TIME)
    }
}

/// Traffic-light status of one diagnostic layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerStatus {
    Success,
    Warning,
    Danger,
    Neutral,
}

/// One diagnostic layer of the image report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerReport {
    pub status: LayerStatus,
    pub label: String,
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
}

impl LayerReport {
    fn new(status: LayerStatus, label: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            status,
            label: label.into(),
            details: details.into(),
            score: None,
        }
    }

    fn with_score(mut self, score: u8) -> Self {
        self.score = Some(score);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageLayers {
    pub provenance: LayerReport,
    pub metadata: LayerReport,
    pub forensics: LayerReport,
    pub ai_detection: LayerReport,
    pub context: LayerReport,
}

/// Fused image report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageReport {
    pub hash: String,
    pub score: CredibilityScore,
    pub verdict: String,
    pub ai_summary: String,
    pub layers: ImageLayers,
}

/// Label for a synthetic-image confidence (layer display only)
pub fn ai_detection_label(confidence: f64, policy: &FusionPolicy) -> &'static str {
    if confidence > policy.ai_generated_confidence {
        VERDICT_AI_GENERATED
    } else if confidence > policy.suspicious_confidence {
        VERDICT_SUSPICIOUS
    } else {
        VERDICT_AUTHENTIC
    }
}

/// Fused score and verdict (the precedence policy alone)
pub fn fuse_image_verdict(
    signals: &ImageSignals,
    policy: &FusionPolicy,
) -> (CredibilityScore, &'static str) {
    let confidence = signals.ai_confidence.unwrap_or(0.0).clamp(0.0, 100.0);

    if signals.camera_attribution().is_some() {
        if confidence > policy.spoof_override_confidence {
            (
                CredibilityScore::new(policy.metadata_spoofed_score),
                VERDICT_METADATA_SPOOFED,
            )
        } else {
            (
                CredibilityScore::new(policy.camera_authentic_score),
                VERDICT_AUTHENTIC,
            )
        }
    } else if confidence > policy.ai_generated_confidence {
        (CredibilityScore::from_f64(100.0 - confidence), VERDICT_AI_GENERATED)
    } else if confidence >= policy.suspicious_confidence {
        (CredibilityScore::new(policy.suspicious_score), VERDICT_SUSPICIOUS)
    } else {
        (
            CredibilityScore::new(policy.web_authentic_score),
            VERDICT_WEB_AUTHENTIC,
        )
    }
}

/// Build the full five-layer report
pub fn fuse_image(signals: &ImageSignals, policy: &FusionPolicy) -> ImageReport {
    let (score, verdict) = fuse_image_verdict(signals, policy);
    let camera = signals.camera_attribution();

    let provenance = LayerReport::new(
        LayerStatus::Success,
        "Hash Recorded",
        format!("SHA-256: {}", signals.hash),
    );

    let metadata = match &camera {
        Some(device) => LayerReport::new(
            LayerStatus::Success,
            "Camera Verified",
            format!("Captured with {}", device),
        ),
        None => LayerReport::new(
            LayerStatus::Warning,
            "No Camera Data",
            format!(
                "No camera make/model in embedded metadata ({} tags found)",
                signals.metadata.len()
            ),
        ),
    };

    let forensics = match signals.noise_variance {
        Some(variance) => LayerReport::new(
            LayerStatus::Neutral,
            "Noise Analysis",
            format!("Edge-noise histogram variance: {:.2}", variance),
        ),
        None => LayerReport::new(
            LayerStatus::Neutral,
            "Noise Analysis",
            "Noise analysis unavailable",
        ),
    };

    let ai_detection = match signals.ai_confidence {
        Some(raw) => {
            let confidence = raw.clamp(0.0, 100.0);
            let label = ai_detection_label(confidence, policy);
            let status = match label {
                VERDICT_AI_GENERATED => LayerStatus::Danger,
                VERDICT_SUSPICIOUS => LayerStatus::Warning,
                _ => LayerStatus::Success,
            };
            LayerReport::new(
                status,
                label,
                format!("Synthetic-image confidence: {:.1}%", confidence),
            )
            .with_score(CredibilityScore::from_f64(confidence).value())
        }
        None => LayerReport::new(
            LayerStatus::Neutral,
            LABEL_NO_AI_PATTERN,
            "AI image classifier unavailable",
        )
        .with_score(0),
    };

    let context = match signals.capture_time() {
        Some(ts) => LayerReport::new(
            LayerStatus::Success,
            "Consistent",
            format!("Original capture time: {}", ts),
        ),
        None => LayerReport::new(
            LayerStatus::Neutral,
            "No Timeline",
            "No original capture timestamp in metadata",
        ),
    };

    let ai_summary = summarize(verdict, score, camera.as_deref(), signals.ai_confidence);

    info!(verdict = verdict, score = %score, camera = camera.is_some(), "Image fused");

    ImageReport {
        hash: signals.hash.clone(),
        score,
        verdict: verdict.to_string(),
        ai_summary,
        layers: ImageLayers {
            provenance,
            metadata,
            forensics,
            ai_detection,
            context,
        },
    }
}

fn summarize(
    verdict: &str,
    score: CredibilityScore,
    camera: Option<&str>,
    confidence: Option<f64>,
) -> String {
    let reason = match (verdict, camera, confidence) {
        (VERDICT_METADATA_SPOOFED, Some(device), Some(c)) => format!(
            "Camera metadata ({}) is present, but the classifier is {:.1}% certain the pixels are synthetic.",
            device, c
        ),
        (VERDICT_AUTHENTIC, Some(device), _) => {
            format!("Embedded camera metadata attributes the image to {}.", device)
        }
        (_, None, None) => {
            "No camera metadata and no AI classifier result; treated as a typical web image."
                .to_string()
        }
        (_, None, Some(c)) => format!(
            "No camera metadata; the AI classifier reports {:.1}% synthetic confidence.",
            c
        ),
        _ => "Review the diagnostic layers below.".to_string(),
    };
    format!("{} ({}/100). {}", verdict, score, reason)
}
