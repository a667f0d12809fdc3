// In-memory filter evaluation, used by the process-local store and by tests.

use serde_json::{Map, Value};

use crate::ast::Filter;

/// Evaluate `filter` against a document body.
pub fn matches(filter: &Filter, body: &Map<String, Value>) -> bool {
    match filter {
        Filter::Everything => true,
        Filter::Eq { path, value } => match path.resolve_in(body) {
            Some(Value::Array(items)) if !value.is_array() => items.contains(value),
            Some(found) => found == value,
            None => false,
        },
        Filter::Contains { path, needle } => match path.resolve_in(body) {
            Some(Value::String(s)) => contains_ignore_case(s, needle),
            _ => false,
        },
        Filter::AnyOf { path, values } => match path.resolve_in(body) {
            Some(Value::String(s)) => values.iter().any(|v| v == s),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .any(|item| values.iter().any(|v| v == item)),
            _ => false,
        },
        Filter::And(filters) => filters.iter().all(|f| matches(f, body)),
        Filter::Or(filters) => filters.iter().any(|f| matches(f, body)),
    }
}

/// Evaluate `filter` against any JSON value; non-objects match only `Everything`.
pub fn matches_value(filter: &Filter, doc: &Value) -> bool {
    match doc {
        Value::Object(body) => matches(filter, body),
        _ => matches(filter, &Map::new()),
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn course() -> Value {
        json!({
            "programTitle": "MBA in AI",
            "programInternalName": "mba-ai-2024",
            "category": "academics",
            "tags": ["ai", "management"],
            "meta": {"status": "draft"},
            "seo": {"metaTitle": null}
        })
    }

    #[test]
    fn eq_on_nested_field() {
        assert!(matches_value(&Filter::eq("meta.status", "draft"), &course()));
        assert!(!matches_value(&Filter::eq("meta.status", "published"), &course()));
    }

    #[test]
    fn eq_on_array_field_matches_element() {
        assert!(matches_value(&Filter::eq("tags", "ai"), &course()));
    }

    #[test]
    fn contains_is_case_insensitive() {
        assert!(matches_value(&Filter::contains("programTitle", "ai"), &course()));
        assert!(matches_value(&Filter::contains("programTitle", "MBA IN"), &course()));
        assert!(!matches_value(&Filter::contains("programTitle", "bba"), &course()));
    }

    #[test]
    fn contains_treats_metacharacters_literally() {
        assert!(!matches_value(&Filter::contains("programTitle", "M.A"), &course()));
        assert!(!matches_value(&Filter::contains("programTitle", "%"), &course()));
    }

    #[test]
    fn contains_ignores_non_string_fields() {
        assert!(!matches_value(&Filter::contains("seo.metaTitle", "ai"), &course()));
        assert!(!matches_value(&Filter::contains("tags", "ai"), &course()));
    }

    #[test]
    fn any_of_intersects_arrays() {
        assert!(matches_value(&Filter::any_of("tags", ["x", "management"]), &course()));
        assert!(!matches_value(&Filter::any_of("tags", ["x", "y"]), &course()));
        assert!(matches_value(&Filter::any_of("category", ["academics"]), &course()));
    }

    #[test]
    fn combinators() {
        let filter = Filter::all([
            Filter::any([
                Filter::contains("programTitle", "zzz"),
                Filter::contains("programInternalName", "2024"),
            ]),
            Filter::eq("category", "academics"),
        ]);
        assert!(matches_value(&filter, &course()));
        assert!(!matches_value(&Filter::nothing(), &course()));
        assert!(!matches_value(&Filter::all([filter, Filter::nothing()]), &course()));
    }

    #[test]
    fn missing_field_never_matches_leaf() {
        assert!(!matches_value(&Filter::eq("subCategory", "pg"), &course()));
        assert!(!matches_value(&Filter::any_of("subCategory", ["pg"]), &course()));
    }
}
