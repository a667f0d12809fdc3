use coursedesk_filter::Filter;
use serde::Deserialize;

use crate::document::status::PublicationStatus;
use crate::params::Scalar;

/// Listing parameters for pages. Without a `status` only published pages are
/// listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub status: Vec<String>,
}

impl PageQuery {
    pub fn with_status(status: &str) -> Self {
        Self {
            status: vec![status.to_string()],
        }
    }

    pub fn to_filter(&self) -> Filter {
        Scalar::of(&self.status)
            .condition(|s| Filter::eq("status", s))
            .unwrap_or_else(|| Filter::eq("status", PublicationStatus::Published.as_str()))
    }
}
