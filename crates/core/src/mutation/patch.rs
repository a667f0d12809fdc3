use coursedesk_filter::FieldPath;
use serde_json::{Map, Value};

use crate::document::model::strip_store_managed;
use crate::document::validate::{CollectionSpec, ValidationError};

/// Field assignments applied to one stored body.
///
/// `set` entries are the requested change. `stamp` entries (modification
/// timestamps, audit snapshots) are written only when the `set` entries
/// actually changed the normalized body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    set: Vec<(FieldPath, Value)>,
    stamp: Vec<(FieldPath, Value)>,
}

/// Result of applying a [`Patch`] to a body.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOutcome {
    Unchanged,
    Changed(Map<String, Value>),
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a patch from a caller's update map. Keys are top-level names or
    /// dotted paths; store-managed keys are ignored.
    pub fn from_updates(mut updates: Map<String, Value>) -> Self {
        strip_store_managed(&mut updates);
        let set = updates
            .into_iter()
            .map(|(key, value)| (FieldPath::parse(&key), value))
            .filter(|(path, _)| !path.is_empty())
            .collect();
        Self {
            set,
            stamp: Vec::new(),
        }
    }

    pub fn set(mut self, path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        self.set.push((path.into(), value.into()));
        self
    }

    pub fn stamp(mut self, path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        self.stamp.push((path.into(), value.into()));
        self
    }

    /// True when the patch requests no change.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Apply to a stored (already normalized) body and re-normalize through
    /// the collection schema.
    pub fn apply(
        &self,
        spec: &CollectionSpec,
        body: &Map<String, Value>,
    ) -> Result<PatchOutcome, ValidationError> {
        let mut next = body.clone();
        for (path, value) in &self.set {
            set_path(&mut next, path, value.clone())?;
        }
        let next = spec.normalize(&next)?;
        if next == *body {
            return Ok(PatchOutcome::Unchanged);
        }
        if self.stamp.is_empty() {
            return Ok(PatchOutcome::Changed(next));
        }
        let mut stamped = next;
        for (path, value) in &self.stamp {
            set_path(&mut stamped, path, value.clone())?;
        }
        Ok(PatchOutcome::Changed(spec.normalize(&stamped)?))
    }
}

/// Assign `value` at `path`, creating intermediate objects as needed.
/// Numeric segments index into existing arrays.
pub fn set_path(
    body: &mut Map<String, Value>,
    path: &FieldPath,
    value: Value,
) -> Result<(), ValidationError> {
    let Some((last, parents)) = path.segments().split_last() else {
        return Ok(());
    };
    let Some((first, rest)) = parents.split_first() else {
        body.insert(last.clone(), value);
        return Ok(());
    };

    let mut current = body
        .entry(first.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    for segment in rest {
        current = child_mut(current, segment, path)?;
    }

    if current.is_null() {
        *current = Value::Object(Map::new());
    }
    match current {
        Value::Object(map) => {
            map.insert(last.clone(), value);
            Ok(())
        }
        Value::Array(items) => {
            let slot = index_of(items.len(), last, path)?;
            items[slot] = value;
            Ok(())
        }
        _ => Err(ValidationError::PathConflict(path.to_string())),
    }
}

fn child_mut<'a>(
    value: &'a mut Value,
    segment: &str,
    path: &FieldPath,
) -> Result<&'a mut Value, ValidationError> {
    if value.is_null() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => Ok(map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()))),
        Value::Array(items) => {
            let slot = index_of(items.len(), segment, path)?;
            Ok(&mut items[slot])
        }
        _ => Err(ValidationError::PathConflict(path.to_string())),
    }
}

fn index_of(len: usize, segment: &str, path: &FieldPath) -> Result<usize, ValidationError> {
    segment
        .parse::<usize>()
        .ok()
        .filter(|i| *i < len)
        .ok_or_else(|| ValidationError::PathConflict(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use crate::document::validate::Schema;

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Card {
        title: String,
        #[serde(default)]
        meta: Meta,
    }

    #[derive(Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Meta {
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        last_modified: Option<String>,
    }

    impl Schema for Card {
        const COLLECTION: &'static str = "Card";
        const ENTITY: &'static str = "Card";
        const UNIQUE_FIELDS: &'static [&'static str] = &[];

        fn validate(&self) -> Result<(), ValidationError> {
            crate::document::validate::require_non_empty("title", &self.title)
        }
    }

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn stored() -> Map<String, Value> {
        obj(json!({"title": "A", "meta": {"status": "draft", "lastModified": null}}))
    }

    #[test]
    fn set_path_creates_intermediate_objects() {
        let mut body = obj(json!({}));
        set_path(&mut body, &"seo.metaTitle".into(), json!("X")).unwrap();
        assert_eq!(Value::Object(body), json!({"seo": {"metaTitle": "X"}}));
    }

    #[test]
    fn set_path_indexes_arrays() {
        let mut body = obj(json!({"universities": [{"name": "A"}, {"name": "B"}]}));
        set_path(&mut body, &"universities.1.name".into(), json!("C")).unwrap();
        assert_eq!(body["universities"][1]["name"], json!("C"));
        assert!(matches!(
            set_path(&mut body, &"universities.5.name".into(), json!("D")),
            Err(ValidationError::PathConflict(_))
        ));
    }

    #[test]
    fn set_path_rejects_scalar_parent() {
        let mut body = obj(json!({"title": "A"}));
        assert!(matches!(
            set_path(&mut body, &"title.first".into(), json!("B")),
            Err(ValidationError::PathConflict(_))
        ));
    }

    #[test]
    fn unchanged_patch_skips_stamps() {
        let spec = CollectionSpec::of::<Card>();
        let patch = Patch::new()
            .set("meta.status", "draft")
            .stamp("meta.lastModified", "now");
        assert_eq!(patch.apply(&spec, &stored()).unwrap(), PatchOutcome::Unchanged);
    }

    #[test]
    fn changed_patch_applies_stamps() {
        let spec = CollectionSpec::of::<Card>();
        let patch = Patch::new()
            .set("meta.status", "published")
            .stamp("meta.lastModified", "now");
        let PatchOutcome::Changed(body) = patch.apply(&spec, &stored()).unwrap() else {
            panic!("expected a change");
        };
        assert_eq!(body["meta"]["status"], json!("published"));
        assert_eq!(body["meta"]["lastModified"], json!("now"));
    }

    #[test]
    fn patch_result_is_revalidated() {
        let spec = CollectionSpec::of::<Card>();
        let patch = Patch::new().set("title", "");
        assert_eq!(
            patch.apply(&spec, &stored()).unwrap_err(),
            ValidationError::Required("title")
        );
    }

    #[test]
    fn from_updates_ignores_store_managed_keys() {
        let patch = Patch::from_updates(obj(json!({"_id": "x", "createdAt": "t", "title": "B"})));
        assert_eq!(patch, Patch::new().set("title", "B"));
    }
}
