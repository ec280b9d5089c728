//! Predicate evaluation against request attributes.
//!
//! Evaluation is pure and infallible. A field the request does not carry
//! reads as the empty string instead of failing the predicate.

use crate::filter::ast::{Expr, Field};

/// The request attributes a predicate can address.
///
/// Values borrow from the inbound request; nothing is copied per request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestAttributes<'a> {
    pub host: &'a str,
    pub path: &'a str,
    pub method: &'a str,
    pub user_agent: &'a str,
}

impl<'a> RequestAttributes<'a> {
    /// Value of `field`; empty for unknown fields.
    pub fn get(&self, field: &Field) -> &'a str {
        match field {
            Field::Host => self.host,
            Field::Path => self.path,
            Field::Method => self.method,
            Field::UserAgent => self.user_agent,
            Field::Unknown(_) => "",
        }
    }
}

/// Evaluate `expr` against `attrs`.
pub fn evaluate(expr: &Expr, attrs: &RequestAttributes<'_>) -> bool {
    match expr {
        Expr::Equals(field, lit) => attrs.get(field) == lit,
        Expr::RegexMatch(field, pattern) => pattern.is_match(attrs.get(field)),
        Expr::Contains(field, lit) => attrs.get(field).contains(lit.as_str()),
        Expr::In(field, set) => set.contains(attrs.get(field)),
        Expr::Not(inner) => !evaluate(inner, attrs),
        Expr::And(lhs, rhs) => evaluate(lhs, attrs) && evaluate(rhs, attrs),
        Expr::Or(lhs, rhs) => evaluate(lhs, attrs) || evaluate(rhs, attrs),
    }
}

impl Expr {
    pub fn evaluate(&self, attrs: &RequestAttributes<'_>) -> bool {
        evaluate(self, attrs)
    }
}
