//! Typed, validated views of the model's replies.
//!
//! [`WasteClassification`] is decoded from the classification reply and
//! [`CleanupJudgment`] from the before/after comparison reply. The
//! verification policy lives on [`CleanupJudgment::evaluate`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::decoder::{DecodeError, decode_embedded, extract_json_object};

/// Descriptive fields stored on the report as its `verification_result`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WasteDetails {
    /// How long the waste takes to degrade.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decomposition_time: Option<String>,
    /// Where this waste typically comes from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_sources: Option<String>,
    /// Effect on nature and wildlife.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environmental_impact: Option<String>,
    /// Risks for humans.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_hazards: Option<String>,
    /// Contribution to emissions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbon_footprint: Option<String>,
    /// Cost or benefit of managing the waste.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub economic_impact: Option<String>,
    /// How to produce less of it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waste_reduction_strategies: Option<String>,
    /// How to recycle or dispose of it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recycling_disposal_methods: Option<String>,
    /// Applicable laws and guidelines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legislation_regulations: Option<String>,
}

/// Validated classification of a waste photo.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WasteClassification {
    /// Waste category (e.g. `plastic`).
    pub waste_type: String,
    /// Estimated quantity (e.g. `5kg`).
    pub quantity: String,
    /// Model confidence in `[0, 1]`.
    pub confidence: f64,
    /// The model's own judgment of whether the photo shows waste, if given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_type: Option<bool>,
    /// Descriptive details.
    pub details: WasteDetails,
}

impl WasteClassification {
    /// Decodes and validates a classification reply.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if no object is embedded, `wasteType` or
    /// `quantity` is missing or blank, or `confidence` is missing or outside
    /// `[0, 1]`.
    pub fn from_model_text(text: &str) -> Result<Self, DecodeError> {
        let map = extract_json_object(text)?;

        let waste_type = required_text(&map, "wasteType")?;
        let quantity = required_text(&map, "quantity")?;
        let confidence = confidence(&map)?;
        let image_type = match map.get("imageType") {
            None | Some(Value::Null) => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            Some(_) => None,
        };

        let details = WasteDetails {
            decomposition_time: optional_text(&map, "decompositionTime"),
            common_sources: optional_text(&map, "commonSources"),
            environmental_impact: optional_text(&map, "environmentalImpact"),
            health_hazards: optional_text(&map, "healthHazards"),
            carbon_footprint: optional_text(&map, "carbonFootprint"),
            economic_impact: optional_text(&map, "economicImpact"),
            waste_reduction_strategies: optional_text(&map, "wasteReductionStrategies"),
            recycling_disposal_methods: optional_text(&map, "recyclingDisposalMethods"),
            legislation_regulations: optional_text(&map, "legislationRegulations"),
        };

        Ok(Self {
            waste_type,
            quantity,
            confidence,
            image_type,
            details,
        })
    }

    /// Returns `true` unless the model explicitly said the photo is not waste.
    #[must_use]
    pub fn shows_waste(&self) -> bool {
        self.image_type != Some(false)
    }
}

/// Text field that may arrive as a string or a number.
fn required_text(map: &Map<String, Value>, field: &'static str) -> Result<String, DecodeError> {
    let text = match map.get(field) {
        None | Some(Value::Null) => return Err(DecodeError::MissingField(field)),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => {
            return Err(DecodeError::InvalidField {
                field,
                reason: format!("expected text, got {other}"),
            });
        }
    };
    if text.is_empty() {
        return Err(DecodeError::InvalidField {
            field,
            reason: "must not be blank".to_string(),
        });
    }
    Ok(text)
}

fn optional_text(map: &Map<String, Value>, field: &str) -> Option<String> {
    match map.get(field)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| item.as_str().map_or_else(|| item.to_string(), str::to_string))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        other => Some(other.to_string()),
    }
}

fn confidence(map: &Map<String, Value>) -> Result<f64, DecodeError> {
    const FIELD: &str = "confidence";
    let value = match map.get(FIELD) {
        None | Some(Value::Null) => return Err(DecodeError::MissingField(FIELD)),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match value {
        Some(c) if c.is_finite() && (0.0..=1.0).contains(&c) => Ok(c),
        Some(c) => Err(DecodeError::InvalidField {
            field: FIELD,
            reason: format!("{c} is outside [0, 1]"),
        }),
        None => Err(DecodeError::InvalidField {
            field: FIELD,
            reason: "expected a number".to_string(),
        }),
    }
}

/// Cleanup state reported by the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum CleanupStatus {
    /// No waste remains.
    #[serde(rename = "fully cleaned")]
    FullyCleaned,
    /// Some waste remains.
    #[serde(rename = "partially cleaned")]
    PartiallyCleaned,
    /// Nothing was cleaned.
    #[serde(rename = "not cleaned")]
    NotCleaned,
}

impl CleanupStatus {
    /// Returns the literal used in model replies.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullyCleaned => "fully cleaned",
            Self::PartiallyCleaned => "partially cleaned",
            Self::NotCleaned => "not cleaned",
        }
    }
}

impl fmt::Display for CleanupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CleanupStatus {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fully cleaned" => Ok(Self::FullyCleaned),
            "partially cleaned" => Ok(Self::PartiallyCleaned),
            "not cleaned" => Ok(Self::NotCleaned),
            _ => Err(DecodeError::InvalidField {
                field: "cleanupStatus",
                reason: format!("unknown status {s:?}"),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for CleanupStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Validated before/after comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupJudgment {
    /// Both photos show the same place.
    pub same_location: bool,
    /// The first photo shows waste.
    pub first_image_has_waste: bool,
    /// Cleanup state in the second photo.
    pub cleanup_status: CleanupStatus,
    /// Waste type seen in the first photo.
    #[serde(default)]
    pub waste_type: Option<String>,
    /// Free-text summary.
    #[serde(default)]
    pub comments: Option<String>,
}

/// Why a judgment does not qualify for a reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// The photos show different places.
    DifferentLocation,
    /// The first photo shows no waste.
    NoWasteInOriginal,
    /// Cleanup is partial or absent.
    NotFullyCleaned,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DifferentLocation => "images are not from the same location",
            Self::NoWasteInOriginal => "original image shows no waste",
            Self::NotFullyCleaned => "site is not fully cleaned",
        })
    }
}

impl CleanupJudgment {
    /// Decodes and validates a comparison reply.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if no object is embedded or a required
    /// field is missing or malformed.
    pub fn from_model_text(text: &str) -> Result<Self, DecodeError> {
        decode_embedded(text)
    }

    /// Applies the reward policy: same location, waste present in the
    /// first photo, and fully cleaned. Partial cleanup earns nothing.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`RejectionReason`].
    pub fn evaluate(&self) -> Result<(), RejectionReason> {
        if !self.same_location {
            return Err(RejectionReason::DifferentLocation);
        }
        if !self.first_image_has_waste {
            return Err(RejectionReason::NoWasteInOriginal);
        }
        if self.cleanup_status != CleanupStatus::FullyCleaned {
            return Err(RejectionReason::NotFullyCleaned);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn judgment(same: bool, waste: bool, status: &str) -> CleanupJudgment {
        let text = format!(
            "{{\"sameLocation\":{same},\"firstImageHasWaste\":{waste},\"cleanupStatus\":\"{status}\",\"wasteType\":\"plastic\",\"comments\":\"ok\"}}"
        );
        let Ok(j) = CleanupJudgment::from_model_text(&text) else {
            panic!("judgment should decode");
        };
        j
    }

    #[test]
    fn classification_example_decodes() {
        let text = r#"Here you go: {"wasteType":"plastic","quantity":"5kg","confidence":0.9,"decompositionTime":"450 years"}"#;
        let Ok(c) = WasteClassification::from_model_text(text) else {
            panic!("classification should decode");
        };
        assert_eq!(c.waste_type, "plastic");
        assert_eq!(c.quantity, "5kg");
        assert_eq!(c.details.decomposition_time.as_deref(), Some("450 years"));
        assert!(c.shows_waste());
    }

    #[test]
    fn classification_requires_core_fields() {
        let missing = WasteClassification::from_model_text(r#"{"quantity":"5kg","confidence":0.5}"#);
        assert_eq!(missing, Err(DecodeError::MissingField("wasteType")));

        let blank = WasteClassification::from_model_text(
            r#"{"wasteType":" ","quantity":"5kg","confidence":0.5}"#,
        );
        assert!(matches!(blank, Err(DecodeError::InvalidField { field: "wasteType", .. })));

        let no_conf =
            WasteClassification::from_model_text(r#"{"wasteType":"glass","quantity":"1kg"}"#);
        assert_eq!(no_conf, Err(DecodeError::MissingField("confidence")));
    }

    #[test]
    fn confidence_must_be_a_probability() {
        let text = r#"{"wasteType":"glass","quantity":"1kg","confidence":85}"#;
        assert!(matches!(
            WasteClassification::from_model_text(text),
            Err(DecodeError::InvalidField { field: "confidence", .. })
        ));
        let as_string = r#"{"wasteType":"glass","quantity":"1kg","confidence":"0.7"}"#;
        assert!(WasteClassification::from_model_text(as_string).is_ok());
    }

    #[test]
    fn explicit_image_type_false_means_not_waste() {
        let text = r#"{"wasteType":"none","quantity":"0","confidence":0.2,"imageType":false}"#;
        let Ok(c) = WasteClassification::from_model_text(text) else {
            panic!("classification should decode");
        };
        assert!(!c.shows_waste());
    }

    #[test]
    fn policy_accepts_only_full_cleanup() {
        assert_eq!(judgment(true, true, "fully cleaned").evaluate(), Ok(()));
        assert_eq!(
            judgment(false, true, "fully cleaned").evaluate(),
            Err(RejectionReason::DifferentLocation)
        );
        assert_eq!(
            judgment(true, false, "fully cleaned").evaluate(),
            Err(RejectionReason::NoWasteInOriginal)
        );
        assert_eq!(
            judgment(true, true, "partially cleaned").evaluate(),
            Err(RejectionReason::NotFullyCleaned)
        );
        assert_eq!(
            judgment(true, true, "not cleaned").evaluate(),
            Err(RejectionReason::NotFullyCleaned)
        );
    }

    #[test]
    fn every_combination_follows_policy() {
        for same in [true, false] {
            for waste in [true, false] {
                for status in ["fully cleaned", "partially cleaned", "not cleaned"] {
                    let passed = judgment(same, waste, status).evaluate().is_ok();
                    assert_eq!(passed, same && waste && status == "fully cleaned");
                }
            }
        }
    }

    #[test]
    fn cleanup_status_accepts_only_exact_literals() {
        assert_eq!("fully cleaned".parse::<CleanupStatus>(), Ok(CleanupStatus::FullyCleaned));
        assert_eq!("not cleaned".parse::<CleanupStatus>(), Ok(CleanupStatus::NotCleaned));
        for variant in ["Fully Cleaned", "FULLY_CLEANED", " fully-cleaned ", "fully cleaned ", "mostly cleaned"] {
            assert!(variant.parse::<CleanupStatus>().is_err(), "{variant:?} accepted");
        }
    }

    #[test]
    fn near_miss_status_never_verifies() {
        let text = r#"{"sameLocation":true,"firstImageHasWaste":true,"cleanupStatus":"Fully Cleaned"}"#;
        assert!(matches!(
            CleanupJudgment::from_model_text(text),
            Err(DecodeError::Schema(_))
        ));
    }

    #[test]
    fn judgment_missing_field_is_schema_error() {
        let text = r#"{"sameLocation":true,"cleanupStatus":"fully cleaned"}"#;
        assert!(matches!(
            CleanupJudgment::from_model_text(text),
            Err(DecodeError::Schema(_))
        ));
    }

    #[test]
    fn judgment_without_object_fails() {
        assert_eq!(
            CleanupJudgment::from_model_text("The site looks clean."),
            Err(DecodeError::NoJsonObject)
        );
    }
}
