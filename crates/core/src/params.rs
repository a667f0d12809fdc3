//! Single-valued listing parameters that may arrive repeated in a query string.

use coursedesk_filter::Filter;

/// How a scalar parameter arrived. Empty values count as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar<'a> {
    Absent,
    One(&'a str),
    /// Given more than once; no single value can satisfy it.
    Repeated,
}

impl<'a> Scalar<'a> {
    pub fn of(values: &'a [String]) -> Self {
        let mut present = values.iter().map(String::as_str).filter(|v| !v.is_empty());
        match (present.next(), present.next()) {
            (None, _) => Scalar::Absent,
            (Some(value), None) => Scalar::One(value),
            (Some(_), Some(_)) => Scalar::Repeated,
        }
    }

    /// `build(value)` for one value, [`Filter::nothing`] when repeated and no
    /// condition when absent.
    pub fn condition(self, build: impl FnOnce(&'a str) -> Filter) -> Option<Filter> {
        match self {
            Scalar::Absent => None,
            Scalar::One(value) => Some(build(value)),
            Scalar::Repeated => Some(Filter::nothing()),
        }
    }
}
