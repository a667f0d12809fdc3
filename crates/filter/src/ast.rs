use serde_json::Value;

use crate::path::FieldPath;

/// Filter predicate over a stored document.
///
/// Leaves compare one field; `And`/`Or` combine them. A document field that is
/// missing never satisfies a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document.
    Everything,

    /// Exact JSON equality. An array field matches when any element is equal.
    Eq { path: FieldPath, value: Value },

    /// Case-insensitive substring containment on a string field.
    Contains { path: FieldPath, needle: String },

    /// The field (a string or an array of strings) shares at least one value
    /// with `values`.
    AnyOf { path: FieldPath, values: Vec<String> },

    And(Vec<Filter>),
    /// Disjunction; no operands matches nothing.
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn contains(path: impl Into<FieldPath>, needle: impl Into<String>) -> Self {
        Filter::Contains {
            path: path.into(),
            needle: needle.into(),
        }
    }

    pub fn any_of<I, S>(path: impl Into<FieldPath>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::AnyOf {
            path: path.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Conjunction of `filters`, collapsing the trivial cases: no operands is
    /// `Everything` and a single operand is returned as is.
    pub fn all(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut operands: Vec<Filter> = filters
            .into_iter()
            .filter(|f| !matches!(f, Filter::Everything))
            .collect();
        match operands.len() {
            0 => Filter::Everything,
            1 => operands.remove(0),
            _ => Filter::And(operands),
        }
    }

    /// Disjunction of `filters`. No operands matches nothing.
    pub fn any(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut operands: Vec<Filter> = filters.into_iter().collect();
        match operands.len() {
            1 => operands.remove(0),
            _ => Filter::Or(operands),
        }
    }

    /// Matches no document.
    pub fn nothing() -> Self {
        Filter::Or(Vec::new())
    }

    pub fn is_everything(&self) -> bool {
        matches!(self, Filter::Everything)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_collapses_trivial_cases() {
        assert_eq!(Filter::all([]), Filter::Everything);
        assert_eq!(
            Filter::all([Filter::Everything, Filter::eq("category", "academics")]),
            Filter::eq("category", "academics")
        );
        assert!(matches!(
            Filter::all([Filter::eq("a", 1), Filter::eq("b", 2)]),
            Filter::And(ref v) if v.len() == 2
        ));
    }

    #[test]
    fn nothing_is_an_empty_disjunction() {
        assert_eq!(Filter::nothing(), Filter::Or(Vec::new()));
        assert_eq!(Filter::any([]), Filter::nothing());
        assert!(!Filter::nothing().is_everything());
    }
}
