//! Syntax tree for `onlyIf` predicates.
//!
//! Trees are immutable once parsed. Regular expressions are compiled by the
//! parser and owned by the node, so evaluation never compiles anything.

use std::collections::BTreeSet;
use std::fmt;

use regex::Regex;

/// Request attribute addressed by a predicate (`http.<name>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Host,
    Path,
    Method,
    UserAgent,
    /// Any other `http.<name>`; always resolves to the empty string.
    Unknown(String),
}

impl Field {
    /// Map the identifier following `http.` to a field.
    pub fn from_name(name: &str) -> Self {
        match name {
            "host" => Field::Host,
            "path" => Field::Path,
            "method" => Field::Method,
            "ua" => Field::UserAgent,
            other => Field::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Field::Host => "host",
            Field::Path => "path",
            Field::Method => "method",
            Field::UserAgent => "ua",
            Field::Unknown(name) => name,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http.{}", self.name())
    }
}

/// A compiled `~` pattern.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(regex: Regex) -> Self {
        Self(regex)
    }

    /// Unanchored search.
    pub fn is_match(&self, haystack: &str) -> bool {
        self.0.is_match(haystack)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Pattern {}

/// Literal set of an `in` comparison.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringSet(BTreeSet<String>);

impl StringSet {
    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromIterator<String> for StringSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Predicate expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `field == "literal"`
    Equals(Field, String),
    /// `field ~ "pattern"`
    RegexMatch(Field, Pattern),
    /// `field contains "literal"`
    Contains(Field, String),
    /// `field in { "a" "b" }`
    In(Field, StringSet),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn not(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }

    pub fn and(lhs: Expr, rhs: Expr) -> Self {
        Expr::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Expr, rhs: Expr) -> Self {
        Expr::Or(Box::new(lhs), Box::new(rhs))
    }

    /// Number of levels in the tree; a single comparison is 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((expr, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            match expr {
                Expr::Not(inner) => pending.push((inner.as_ref(), depth + 1)),
                Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => {
                    pending.push((lhs.as_ref(), depth + 1));
                    pending.push((rhs.as_ref(), depth + 1));
                }
                _ => {}
            }
        }
        deepest
    }
}

/// Renders the canonical source form. Every subexpression is parenthesized,
/// so the output re-parses to an equal tree.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Equals(field, lit) => write!(f, "{} == {}", field, Quoted(lit)),
            Expr::RegexMatch(field, pattern) => {
                write!(f, "{} ~ {}", field, Quoted(pattern.as_str()))
            }
            Expr::Contains(field, lit) => write!(f, "{} contains {}", field, Quoted(lit)),
            Expr::In(field, set) => {
                write!(f, "{} in {{", field)?;
                for value in set.iter() {
                    write!(f, " {}", Quoted(value))?;
                }
                write!(f, " }}")
            }
            Expr::Not(inner) => write!(f, "not ({})", inner),
            Expr::And(lhs, rhs) => write!(f, "({}) and ({})", lhs, rhs),
            Expr::Or(lhs, rhs) => write!(f, "({}) or ({})", lhs, rhs),
        }
    }
}

struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        let mut chars = self.0.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '"' => f.write_str("\\\"")?,
                // A lone backslash is kept verbatim by the parser unless it
                // precedes a quote or another backslash.
                '\\' if matches!(chars.peek(), None | Some('"') | Some('\\')) => {
                    f.write_str("\\\\")?
                }
                other => write!(f, "{}", other)?,
            }
        }
        f.write_str("\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_from_name() {
        assert_eq!(Field::from_name("host"), Field::Host);
        assert_eq!(Field::from_name("ua"), Field::UserAgent);
        assert_eq!(
            Field::from_name("version"),
            Field::Unknown("version".to_string())
        );
        assert_eq!(Field::Method.to_string(), "http.method");
    }

    #[test]
    fn test_depth() {
        let leaf = || Expr::Equals(Field::Method, "GET".to_string());
        assert_eq!(leaf().depth(), 1);
        assert_eq!(Expr::not(leaf()).depth(), 2);
        assert_eq!(Expr::or(Expr::and(leaf(), Expr::not(leaf())), leaf()).depth(), 4);
    }

    #[test]
    fn test_display_set() {
        let set: StringSet = ["b", "a"].into_iter().map(String::from).collect();
        let expr = Expr::In(Field::Host, set);
        assert_eq!(expr.to_string(), r#"http.host in { "a" "b" }"#);
    }

    #[test]
    fn test_display_escapes_quotes() {
        let expr = Expr::Equals(Field::UserAgent, "say \"hi\"".to_string());
        assert_eq!(expr.to_string(), r#"http.ua == "say \"hi\"""#);
    }
}
