//! Collection query model: equality/range filters, one ordering, a limit.
//!
//! This is the common subset of what hosted document databases offer. It is
//! evaluated in-process by the in-memory store and translated to SQL by the
//! Postgres store.

use std::cmp::Ordering;

use serde_json::Value as JsonValue;

use super::StoredDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl FilterOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Lt => "<",
            FilterOp::Le => "<=",
            FilterOp::Gt => ">",
            FilterOp::Ge => ">=",
        }
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            FilterOp::Eq => ordering == Ordering::Equal,
            FilterOp::Lt => ordering == Ordering::Less,
            FilterOp::Le => ordering != Ordering::Greater,
            FilterOp::Gt => ordering == Ordering::Greater,
            FilterOp::Ge => ordering != Ordering::Less,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: JsonValue,
}

impl Filter {
    /// A document without the field never matches.
    pub fn matches(&self, doc: &StoredDocument) -> bool {
        let Some(actual) = doc.field(&self.field) else {
            return false;
        };
        match self.op {
            FilterOp::Eq => json_eq(&actual, &self.value),
            op => compare_json(&actual, &self.value).is_some_and(|ord| op.accepts(ord)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// A query over one collection. The empty query returns every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: impl Into<String>, op: FilterOp, value: impl Into<JsonValue>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn where_eq(self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.filter(field, FilterOp::Eq, value)
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, doc: &StoredDocument) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
    }

    /// Filter, order and truncate an in-memory result set.
    ///
    /// Sorting is stable; documents missing the order field sort last.
    pub fn apply(&self, docs: impl IntoIterator<Item = StoredDocument>) -> Vec<StoredDocument> {
        let mut out: Vec<StoredDocument> = docs.into_iter().filter(|d| self.matches(d)).collect();

        if let Some(order) = &self.order_by {
            out.sort_by(|a, b| {
                let ord = match (a.field(&order.field), b.field(&order.field)) {
                    (Some(x), Some(y)) => compare_json(&x, &y).unwrap_or(Ordering::Equal),
                    (Some(_), None) => return Ordering::Less,
                    (None, Some(_)) => return Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                match order.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }

        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }
}

/// Equality with numeric normalisation (`42 == 42.0`).
fn json_eq(a: &JsonValue, b: &JsonValue) -> bool {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Ordering between two values of the same JSON type; `None` across types.
pub fn compare_json(a: &JsonValue, b: &JsonValue) -> Option<Ordering> {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (JsonValue::String(x), JsonValue::String(y)) => Some(x.cmp(y)),
        (JsonValue::Bool(x), JsonValue::Bool(y)) => Some(x.cmp(y)),
        (JsonValue::Null, JsonValue::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    use crate::store::Document;

    fn doc(id: &str, body: JsonValue) -> StoredDocument {
        let data: Document = body.as_object().cloned().unwrap_or_default();
        let now = Utc::now();
        StoredDocument {
            id: id.parse().unwrap(),
            data,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn equality_normalises_numbers_and_requires_field() {
        let d = doc("a", json!({ "price": 42, "isActive": true }));
        assert!(Query::new().where_eq("price", 42.0).matches(&d));
        assert!(Query::new().where_eq("isActive", true).matches(&d));
        assert!(!Query::new().where_eq("featured", false).matches(&d));
    }

    #[test]
    fn range_filters_do_not_cross_types() {
        let d = doc("a", json!({ "stock": 5, "sku": "B" }));
        assert!(Query::new().filter("stock", FilterOp::Le, 5).matches(&d));
        assert!(!Query::new().filter("stock", FilterOp::Lt, 5).matches(&d));
        assert!(Query::new().filter("sku", FilterOp::Gt, "A").matches(&d));
        assert!(!Query::new().filter("sku", FilterOp::Le, 10).matches(&d));
    }

    #[test]
    fn apply_orders_then_limits_with_missing_fields_last() {
        let docs = vec![
            doc("a", json!({ "stock": 9 })),
            doc("b", json!({})),
            doc("c", json!({ "stock": 1 })),
            doc("d", json!({ "stock": 4 })),
        ];

        let asc = Query::new().order_by("stock", Direction::Asc).apply(docs.clone());
        let ids: Vec<_> = asc.iter().map(|d| d.id.to_string()).collect();
        assert_eq!(ids, vec!["c", "d", "a", "b"]);

        let top2 = Query::new()
            .order_by("stock", Direction::Desc)
            .limit(2)
            .apply(docs);
        let ids: Vec<_> = top2.iter().map(|d| d.id.to_string()).collect();
        assert_eq!(ids, vec!["a", "d"]);
    }
}
