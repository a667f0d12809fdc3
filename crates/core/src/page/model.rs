use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::status::PublicationStatus;
use crate::document::validate::{require_non_empty, Schema, ValidationError};

/// Kind of site page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageType {
    #[serde(rename = "course_landing")]
    CourseLanding,
    #[serde(rename = "about")]
    About,
    #[serde(rename = "home")]
    Home,
    #[serde(rename = "terms&conditions")]
    TermsAndConditions,
    #[serde(rename = "faq")]
    Faq,
    #[serde(rename = "course_card")]
    CourseCard,
    #[serde(rename = "footer")]
    Footer,
    #[serde(rename = "navbar")]
    Navbar,
    #[serde(rename = "privacyPolicy")]
    PrivacyPolicy,
}

/// A content page addressed by its slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(rename = "type")]
    pub kind: PageType,
    pub slug: String,
    pub title: String,
    /// Ordered content blocks; their shape belongs to the front end.
    #[serde(default)]
    pub content_blocks: Vec<Value>,
    #[serde(default)]
    pub seo: PageSeo,
    #[serde(default)]
    pub status: PublicationStatus,
    #[serde(default)]
    pub publish_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSeo {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub og_image: Option<String>,
    pub canonical: Option<String>,
}

impl Schema for Page {
    const COLLECTION: &'static str = "Page";
    const ENTITY: &'static str = "Page";
    const UNIQUE_FIELDS: &'static [&'static str] = &["slug"];

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("slug", &self.slug)?;
        require_non_empty("title", &self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::validate::normalize_as;
    use serde_json::json;

    #[test]
    fn page_types_use_wire_names() {
        for (kind, wire) in [
            (PageType::TermsAndConditions, "terms&conditions"),
            (PageType::PrivacyPolicy, "privacyPolicy"),
            (PageType::CourseLanding, "course_landing"),
        ] {
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(wire));
        }
    }

    #[test]
    fn page_defaults_and_required_fields() {
        let body = json!({"type": "faq", "slug": "faq", "title": "FAQ"});
        let out = Value::Object(normalize_as::<Page>(body.as_object().unwrap()).unwrap());
        assert_eq!(out["status"], json!("draft"));
        assert_eq!(out["contentBlocks"], json!([]));

        let missing_type = json!({"slug": "faq", "title": "FAQ"});
        assert!(matches!(
            normalize_as::<Page>(missing_type.as_object().unwrap()).unwrap_err(),
            ValidationError::Schema(_)
        ));
        let bad_type = json!({"type": "blog", "slug": "faq", "title": "FAQ"});
        assert!(normalize_as::<Page>(bad_type.as_object().unwrap()).is_err());
    }

    #[test]
    fn content_blocks_keep_order_and_shape() {
        let blocks = json!([{"kind": "hero", "text": "Hi"}, "raw", 3]);
        let body = json!({"type": "home", "slug": "home", "title": "Home", "contentBlocks": blocks});
        let out = normalize_as::<Page>(body.as_object().unwrap()).unwrap();
        assert_eq!(out["contentBlocks"], blocks);
    }
}
