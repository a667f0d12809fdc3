// Rendering of filter predicates into PostgreSQL over the `body` JSONB column.
//
// Every leaf is wrapped in COALESCE(.., FALSE) so a missing field evaluates
// to false rather than NULL, matching the in-memory evaluator.

use coursedesk_filter::{FieldPath, Filter};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder};

/// Append `filter` as a boolean SQL expression.
pub fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    match filter {
        Filter::Everything => {
            qb.push("TRUE");
        }
        Filter::Eq { path, value } if value.is_array() => {
            qb.push("COALESCE(body #> ")
                .push_bind(segments(path))
                .push(" = ")
                .push_bind(Json(value.clone()))
                .push(", FALSE)");
        }
        Filter::Eq { path, value } => {
            qb.push("COALESCE((body #> ")
                .push_bind(segments(path))
                .push(" = ")
                .push_bind(Json(value.clone()))
                .push(" OR body #> ")
                .push_bind(segments(path))
                .push(" @> ")
                .push_bind(Json(Value::Array(vec![value.clone()])))
                .push("), FALSE)");
        }
        Filter::Contains { path, needle } => {
            qb.push("COALESCE((jsonb_typeof(body #> ")
                .push_bind(segments(path))
                .push(") = 'string' AND body #>> ")
                .push_bind(segments(path))
                .push(" ILIKE ")
                .push_bind(like_pattern(needle))
                .push("), FALSE)");
        }
        Filter::AnyOf { path, values } => {
            qb.push("COALESCE((jsonb_typeof(body #> ")
                .push_bind(segments(path))
                .push(") IN ('array', 'string') AND body #> ")
                .push_bind(segments(path))
                .push(" ?| ")
                .push_bind(values.clone())
                .push("), FALSE)");
        }
        Filter::And(filters) => push_joined(qb, filters, " AND ", "TRUE"),
        Filter::Or(filters) => push_joined(qb, filters, " OR ", "FALSE"),
    }
}

fn push_joined(
    qb: &mut QueryBuilder<'_, Postgres>,
    filters: &[Filter],
    separator: &str,
    empty: &str,
) {
    if filters.is_empty() {
        qb.push(empty);
        return;
    }
    qb.push("(");
    for (i, filter) in filters.iter().enumerate() {
        if i > 0 {
            qb.push(separator);
        }
        push_filter(qb, filter);
    }
    qb.push(")");
}

fn segments(path: &FieldPath) -> Vec<String> {
    path.segments().to_vec()
}

/// `%needle%` with LIKE metacharacters escaped, for literal containment.
pub fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(filter: &Filter) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("");
        push_filter(&mut qb, filter);
        qb.sql().to_string()
    }

    #[test]
    fn everything_renders_true() {
        assert_eq!(render(&Filter::Everything), "TRUE");
    }

    #[test]
    fn eq_checks_value_and_array_membership() {
        assert_eq!(
            render(&Filter::eq("meta.status", "draft")),
            "COALESCE((body #> $1 = $2 OR body #> $3 @> $4), FALSE)"
        );
    }

    #[test]
    fn contains_uses_ilike_on_strings() {
        assert_eq!(
            render(&Filter::contains("programTitle", "ai")),
            "COALESCE((jsonb_typeof(body #> $1) = 'string' AND body #>> $2 ILIKE $3), FALSE)"
        );
    }

    #[test]
    fn combinators_nest_with_parentheses() {
        let filter = Filter::all([
            Filter::any([
                Filter::contains("programTitle", "ai"),
                Filter::contains("seo.metaTitle", "ai"),
            ]),
            Filter::any_of("tags", ["x"]),
        ]);
        assert_eq!(
            render(&filter),
            "((COALESCE((jsonb_typeof(body #> $1) = 'string' AND body #>> $2 ILIKE $3), FALSE) \
             OR COALESCE((jsonb_typeof(body #> $4) = 'string' AND body #>> $5 ILIKE $6), FALSE)) \
             AND COALESCE((jsonb_typeof(body #> $7) IN ('array', 'string') AND body #> $8 ?| $9), FALSE))"
        );
    }

    #[test]
    fn empty_disjunction_renders_false() {
        assert_eq!(render(&Filter::nothing()), "FALSE");
    }

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("AI"), "%AI%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}
