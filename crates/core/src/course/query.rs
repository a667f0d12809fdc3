use coursedesk_filter::Filter;
use serde::Deserialize;

use crate::params::Scalar;

/// Fields searched by the free-text `q` parameter.
pub const SEARCH_FIELDS: &[&str] = &["programTitle", "programInternalName", "seo.metaTitle"];

/// Listing parameters for course cards, one entry per occurrence in the query
/// string. Empty strings count as absent; `q`, `category` and `status` given
/// more than once match nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CourseQuery {
    #[serde(default)]
    pub q: Vec<String>,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub status: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CourseQuery {
    /// Conjunction of every present condition; `Filter::Everything` when none is.
    pub fn to_filter(&self) -> Filter {
        let mut conditions = Vec::new();

        conditions.extend(Scalar::of(&self.q).condition(|q| {
            Filter::any(SEARCH_FIELDS.iter().map(|field| Filter::contains(*field, q)))
        }));
        conditions.extend(Scalar::of(&self.category).condition(|c| Filter::eq("category", c)));
        // An unknown status simply matches nothing.
        conditions.extend(Scalar::of(&self.status).condition(|s| Filter::eq("meta.status", s)));
        let tags: Vec<&str> = self
            .tags
            .iter()
            .map(String::as_str)
            .filter(|t| !t.is_empty())
            .collect();
        if !tags.is_empty() {
            conditions.push(Filter::any_of("tags", tags));
        }

        Filter::all(conditions)
    }
}
