//! Predicate filtering for store queries
//!
//! Filters documents by field predicates with AND semantics.
//! Equality against an array field matches when any element is equal,
//! which is how course membership (`students` contains id) is expressed.

use serde_json::Value;

use super::ID_FIELD;

/// Filter operator
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// Field equals value (or array field contains it)
    Eq(Value),
    /// Field equals any of the values
    In(Vec<Value>),
}

/// A single field predicate
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub op: FilterOp,
}

/// Conjunction of predicates. An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    /// Matches every document
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches the document with the given `_id`
    pub fn by_id(id: impl Into<Value>) -> Self {
        Self::all().eq(ID_FIELD, id)
    }

    /// Add an equality predicate
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate {
            field: field.into(),
            op: FilterOp::Eq(value.into()),
        });
        self
    }

    /// Add a membership predicate
    pub fn any_of(mut self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.predicates.push(Predicate {
            field: field.into(),
            op: FilterOp::In(values),
        });
        self
    }

    /// Checks if a document matches all predicates
    pub fn matches(&self, document: &Value) -> bool {
        self.predicates
            .iter()
            .all(|pred| matches_predicate(document, pred))
    }
}

fn matches_predicate(document: &Value, predicate: &Predicate) -> bool {
    let field_value = match lookup(document, &predicate.field) {
        Some(v) => v,
        None => return false,
    };

    // Null values never match
    if field_value.is_null() {
        return false;
    }

    match &predicate.op {
        FilterOp::Eq(expected) => eq_or_contains(field_value, expected),
        FilterOp::In(candidates) => candidates
            .iter()
            .any(|expected| eq_or_contains(field_value, expected)),
    }
}

fn eq_or_contains(actual: &Value, expected: &Value) -> bool {
    if values_equal(actual, expected) {
        return true;
    }
    match actual {
        Value::Array(items) => items.iter().any(|item| values_equal(item, expected)),
        _ => false,
    }
}

/// Value equality with numbers compared numerically, so `1` equals `1.0`.
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(xi), Some(yi)) => xi == yi,
            _ => x.as_f64() == y.as_f64(),
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xm), Value::Object(ym)) => {
            xm.len() == ym.len()
                && xm
                    .iter()
                    .all(|(k, xv)| ym.get(k).is_some_and(|yv| values_equal(xv, yv)))
        }
        _ => a == b,
    }
}

/// Resolve a dotted field path (`assignments.score`) inside a document.
pub(crate) fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |current, segment| current.get(segment))
}
