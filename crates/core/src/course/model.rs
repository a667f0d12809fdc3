use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::document::model::Actor;
use crate::document::status::PublicationStatus;
use crate::document::validate::{require_non_empty, require_range, Schema, ValidationError};

pub const COURSE_CARD_TYPE: &str = "course_card";
pub const SCHEMA_VERSION: u32 = 2;

/// A course card: one program offering in the public catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseCard {
    #[serde(rename = "type", default = "default_card_type")]
    pub kind: String,
    pub program_internal_name: String,
    pub program_title: String,
    pub category: String,
    #[serde(default)]
    pub sub_category: Option<String>,

    #[serde(default)]
    pub media: Media,
    #[serde(default)]
    pub pricing: Pricing,
    #[serde(default)]
    pub duration: Duration,
    #[serde(default)]
    pub delivery: Delivery,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub cta_buttons: Vec<CtaButton>,
    #[serde(default)]
    pub universities: Vec<University>,
    #[serde(default)]
    pub specializations: Vec<Specialization>,

    pub meta: CourseMeta,
    #[serde(default)]
    pub seo: CourseSeo,
    #[serde(default)]
    pub metrics: Metrics,

    #[serde(default)]
    pub created_by: Actor,
    #[serde(default)]
    pub updated_by: Actor,
    /// Declared for compatibility; nothing sets or filters on it.
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,

    #[serde(rename = "_schemaVersion", default = "default_schema_version")]
    pub schema_version: u32,
}

fn default_card_type() -> String {
    COURSE_CARD_TYPE.to_string()
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub thumbnail_url: Option<String>,
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    #[serde(default)]
    pub fee_range: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub scholarships: Option<bool>,
    #[serde(default)]
    pub emi_available: Option<bool>,
    #[serde(default)]
    pub no_cost_emi: Option<bool>,
}

fn default_currency() -> String {
    "INR".to_string()
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            fee_range: None,
            currency: default_currency(),
            scholarships: None,
            emi_available: None,
            no_cost_emi: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Duration {
    pub label: Option<String>,
    pub min_months: Option<Number>,
    pub max_months: Option<Number>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    /// Online, Hybrid or Offline.
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub format: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CtaButton {
    pub label: Option<String>,
    pub url: Option<String>,
    pub opens_form: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct University {
    pub name: Option<String>,
    pub logo_url: Option<String>,
    pub source_id: Option<Number>,
    pub partnership_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specialization {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub university_offering: Vec<UniversityOffering>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversityOffering {
    pub university_name: Option<String>,
    pub source_id: Option<Number>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseMeta {
    pub slug: String,
    #[serde(default)]
    pub canonical_url: Option<String>,
    #[serde(default)]
    pub status: PublicationStatus,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default = "default_priority")]
    pub priority: f64,
    #[serde(default)]
    pub publish_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

fn default_priority() -> f64 {
    0.5
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSeo {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub og_image: Option<String>,
    pub schema_type: Option<String>,
}

/// Engagement counters. Incremented elsewhere; never by this crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
    pub views: u64,
    pub clicks: u64,
    pub conversions: u64,
}

impl Schema for CourseCard {
    const COLLECTION: &'static str = "CourseCard";
    const ENTITY: &'static str = "Course";
    const UNIQUE_FIELDS: &'static [&'static str] = &["programInternalName", "meta.slug"];

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("programInternalName", &self.program_internal_name)?;
        require_non_empty("programTitle", &self.program_title)?;
        require_non_empty("category", &self.category)?;
        require_non_empty("meta.slug", &self.meta.slug)?;
        require_range("meta.priority", self.meta.priority, 0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::validate::normalize_as;
    use serde_json::{json, Map, Value};

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn minimal() -> Value {
        json!({
            "programInternalName": "mba-ai-2024",
            "programTitle": "MBA AI",
            "category": "academics",
            "meta": {"slug": "mba-ai"}
        })
    }

    #[test]
    fn minimal_card_gets_defaults() {
        let out = Value::Object(normalize_as::<CourseCard>(&body(minimal())).unwrap());
        assert_eq!(out["type"], json!("course_card"));
        assert_eq!(out["meta"]["status"], json!("draft"));
        assert_eq!(out["meta"]["visibility"], json!("public"));
        assert_eq!(out["meta"]["priority"], json!(0.5));
        assert_eq!(out["pricing"]["currency"], json!("INR"));
        assert_eq!(out["metrics"], json!({"views": 0, "clicks": 0, "conversions": 0}));
        assert_eq!(out["tags"], json!([]));
        assert_eq!(out["deletedAt"], Value::Null);
        assert_eq!(out["_schemaVersion"], json!(2));
    }

    #[test]
    fn missing_slug_is_rejected() {
        let mut card = minimal();
        card["meta"] = json!({});
        let err = normalize_as::<CourseCard>(&body(card)).unwrap_err();
        assert!(matches!(err, ValidationError::Schema(ref m) if m.contains("slug")));
    }

    #[test]
    fn empty_required_string_is_rejected() {
        let mut card = minimal();
        card["programTitle"] = json!("");
        assert_eq!(
            normalize_as::<CourseCard>(&body(card)).unwrap_err(),
            ValidationError::Required("programTitle")
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut card = minimal();
        card["meta"]["status"] = json!("archived");
        assert!(matches!(
            normalize_as::<CourseCard>(&body(card)).unwrap_err(),
            ValidationError::Schema(_)
        ));
    }

    #[test]
    fn priority_must_be_within_unit_range() {
        let mut card = minimal();
        card["meta"]["priority"] = json!(1.5);
        assert!(matches!(
            normalize_as::<CourseCard>(&body(card)).unwrap_err(),
            ValidationError::OutOfRange { field: "meta.priority", .. }
        ));
    }

    #[test]
    fn nested_records_round_trip() {
        let mut card = minimal();
        card["universities"] = json!([{"name": "NMIMS", "sourceId": 7, "partnershipType": "Academic Partner"}]);
        card["specializations"] = json!([{"name": "Finance", "universityOffering": [{"universityName": "NMIMS", "sourceId": 7}]}]);
        card["delivery"] = json!({"mode": "Online", "format": ["Live", "Recorded"]});
        let out = Value::Object(normalize_as::<CourseCard>(&body(card)).unwrap());
        assert_eq!(out["universities"][0]["sourceId"], json!(7));
        assert_eq!(
            out["specializations"][0]["universityOffering"][0]["universityName"],
            json!("NMIMS")
        );
        assert_eq!(out["delivery"]["format"], json!(["Live", "Recorded"]));
    }

    #[test]
    fn numeric_fields_accept_fractions() {
        let mut card = minimal();
        card["duration"] = json!({"label": "18 months", "minMonths": 1.5, "maxMonths": 24});
        card["universities"] = json!([{"name": "NMIMS", "sourceId": 7.5}]);
        let out = Value::Object(normalize_as::<CourseCard>(&body(card)).unwrap());
        assert_eq!(out["duration"]["minMonths"], json!(1.5));
        assert_eq!(out["duration"]["maxMonths"], json!(24));
        assert_eq!(out["universities"][0]["sourceId"], json!(7.5));

        let mut card = minimal();
        card["duration"] = json!({"minMonths": "six"});
        assert!(normalize_as::<CourseCard>(&body(card)).is_err());
    }
}
