//! Predicate parser.
//!
//! ```text
//! expr       := or_expr
//! or_expr    := and_expr ( "or" and_expr )*
//! and_expr   := unary ( "and" unary )*
//! unary      := "not" unary | "(" expr ")" | comparison
//! comparison := field ( "==" string | "~" string | "contains" string | "in" set )
//! field      := "http" "." identifier
//! set        := "{" string ( WS string )* "}"
//! ```
//!
//! Set members are separated by whitespace only; a comma is a syntax error.
//! Regex literals are compiled here so a bad pattern is rejected with the
//! rest of the configuration update.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, multispace0, multispace1, satisfy},
    combinator::{cut, map, not, peek, recognize, value},
    error::{ErrorKind, ParseError},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};
use regex::RegexBuilder;
use thiserror::Error;

use crate::filter::ast::{Expr, Field, Pattern, StringSet};

/// Upper bound on the compiled size of a single `~` pattern.
const REGEX_SIZE_LIMIT: usize = 1 << 20;

/// How deeply `not` and parentheses may nest.
const MAX_NESTING: usize = 64;

/// Deepest expression tree a predicate may produce. Evaluation recurses
/// once per level.
const MAX_TREE_DEPTH: usize = 256;

/// Why a predicate was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("expected {0}")]
    Expected(&'static str),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("invalid regex: {0}")]
    InvalidRegex(String),

    #[error("unexpected trailing input")]
    TrailingInput,

    #[error("expression nested too deeply")]
    TooDeep,
}

/// A predicate that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error at offset {offset}: {kind}")]
pub struct SyntaxError {
    /// Byte offset into the source where parsing failed.
    pub offset: usize,
    pub kind: SyntaxErrorKind,
}

#[derive(Debug, Clone, PartialEq)]
struct Failure<'a> {
    input: &'a str,
    kind: SyntaxErrorKind,
}

impl<'a> ParseError<&'a str> for Failure<'a> {
    fn from_error_kind(input: &'a str, _kind: ErrorKind) -> Self {
        Self {
            input,
            kind: SyntaxErrorKind::Expected("a valid token"),
        }
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

type PResult<'a, O> = IResult<&'a str, O, Failure<'a>>;

/// Parse a predicate source string into an expression tree.
pub fn parse(source: &str) -> Result<Expr, SyntaxError> {
    let offset_of = |rest: &str| source.len() - rest.len();

    match delimited(multispace0, predicate, multispace0)(source) {
        Ok(("", expr)) => Ok(expr),
        Ok((rest, _)) => Err(SyntaxError {
            offset: offset_of(rest),
            kind: if rest.starts_with(')') {
                SyntaxErrorKind::Expected("matching `(`")
            } else {
                SyntaxErrorKind::TrailingInput
            },
        }),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(SyntaxError {
            offset: offset_of(e.input),
            kind: e.kind,
        }),
        Err(nom::Err::Incomplete(_)) => Err(SyntaxError {
            offset: source.len(),
            kind: SyntaxErrorKind::Expected("more input"),
        }),
    }
}

/// Replace a generic nom error with a description of what was expected.
fn expected<'a, O, F>(what: &'static str, mut parser: F) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: FnMut(&'a str) -> PResult<'a, O>,
{
    move |input| {
        parser(input).map_err(|e| {
            e.map(|mut failure| {
                if failure.kind == SyntaxErrorKind::Expected("a valid token") {
                    failure.kind = SyntaxErrorKind::Expected(what);
                }
                failure
            })
        })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A reserved word not immediately followed by an identifier character.
fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    terminated(tag(word), not(peek(satisfy(is_ident_char))))
}

fn predicate(input: &str) -> PResult<'_, Expr> {
    expr(input, 0)
}

fn expr<'a>(input: &'a str, nesting: usize) -> PResult<'a, Expr> {
    or_expr(input, nesting)
}

fn or_expr<'a>(input: &'a str, nesting: usize) -> PResult<'a, Expr> {
    let start = input;
    let (input, first) = and_expr(input, nesting)?;
    let (input, rest) = many0(preceded(
        delimited(multispace0, keyword("or"), multispace0),
        cut(move |i: &'a str| and_expr(i, nesting)),
    ))(input)?;
    Ok((input, fold_chain(start, first, rest, Expr::or)?))
}

fn and_expr<'a>(input: &'a str, nesting: usize) -> PResult<'a, Expr> {
    let start = input;
    let (input, first) = unary(input, nesting)?;
    let (input, rest) = many0(preceded(
        delimited(multispace0, keyword("and"), multispace0),
        cut(move |i: &'a str| unary(i, nesting)),
    ))(input)?;
    Ok((input, fold_chain(start, first, rest, Expr::and)?))
}

/// Left-fold a chain of operands, refusing trees deeper than
/// [`MAX_TREE_DEPTH`].
fn fold_chain<'a>(
    start: &'a str,
    first: Expr,
    rest: Vec<Expr>,
    join: fn(Expr, Expr) -> Expr,
) -> Result<Expr, nom::Err<Failure<'a>>> {
    let mut depth = first.depth();
    let mut acc = first;
    for operand in rest {
        depth = depth.max(operand.depth()) + 1;
        if depth > MAX_TREE_DEPTH {
            return Err(too_deep(start));
        }
        acc = join(acc, operand);
    }
    Ok(acc)
}

fn too_deep(input: &str) -> nom::Err<Failure<'_>> {
    nom::Err::Failure(Failure {
        input,
        kind: SyntaxErrorKind::TooDeep,
    })
}

fn unary<'a>(input: &'a str, nesting: usize) -> PResult<'a, Expr> {
    if nesting >= MAX_NESTING {
        return Err(too_deep(input));
    }
    let inner = nesting + 1;

    expected(
        "`not`, `(` or a field",
        alt((
            preceded(pair(keyword("not"), multispace0), cut(move |i: &'a str| negation(i, inner))),
            preceded(
                pair(char('('), multispace0),
                cut(terminated(
                    move |i: &'a str| expr(i, inner),
                    pair(multispace0, expected("closing `)`", char(')'))),
                )),
            ),
            comparison,
        )),
    )(input)
}

fn negation<'a>(input: &'a str, nesting: usize) -> PResult<'a, Expr> {
    let (rest, operand) = unary(input, nesting)?;
    if operand.depth() + 1 > MAX_TREE_DEPTH {
        return Err(too_deep(input));
    }
    Ok((rest, Expr::not(operand)))
}

#[derive(Debug, Clone, Copy)]
enum Operator {
    Equals,
    RegexMatch,
    Contains,
    In,
}

fn operator(input: &str) -> PResult<'_, Operator> {
    expected(
        "operator `==`, `~`, `contains` or `in`",
        alt((
            value(Operator::Equals, tag("==")),
            value(Operator::RegexMatch, char('~')),
            value(Operator::Contains, keyword("contains")),
            value(Operator::In, keyword("in")),
        )),
    )(input)
}

fn comparison(input: &str) -> PResult<'_, Expr> {
    let (input, field) = field(input)?;
    let (input, op) = cut(preceded(multispace0, operator))(input)?;
    let (input, _) = multispace0(input)?;

    match op {
        Operator::Equals => {
            let (input, lit) = cut(string)(input)?;
            Ok((input, Expr::Equals(field, lit)))
        }
        Operator::Contains => {
            let (input, lit) = cut(string)(input)?;
            Ok((input, Expr::Contains(field, lit)))
        }
        Operator::In => {
            let (input, set) = cut(set)(input)?;
            Ok((input, Expr::In(field, set)))
        }
        Operator::RegexMatch => {
            let start = input;
            let (input, source) = cut(string)(input)?;
            let regex = RegexBuilder::new(&source)
                .size_limit(REGEX_SIZE_LIMIT)
                .build()
                .map_err(|e| {
                    nom::Err::Failure(Failure {
                        input: start,
                        kind: SyntaxErrorKind::InvalidRegex(e.to_string()),
                    })
                })?;
            Ok((input, Expr::RegexMatch(field, Pattern::new(regex))))
        }
    }
}

fn field(input: &str) -> PResult<'_, Field> {
    let (input, _) = terminated(keyword("http"), char('.'))(input)?;
    let (input, name) = cut(expected(
        "field name after `http.`",
        recognize(pair(
            satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
            take_while(is_ident_char),
        )),
    ))(input)?;
    Ok((input, Field::from_name(name)))
}

/// Double-quoted literal. `\"` and `\\` are escapes; any other backslash is
/// kept as written so regex escapes survive unchanged.
fn string(input: &str) -> PResult<'_, String> {
    let (mut rest, _) = expected("string literal", char('"'))(input)?;
    let mut out = String::new();

    loop {
        let (remaining, plain) = take_while::<_, _, Failure<'_>>(|c: char| c != '"' && c != '\\')(rest)?;
        out.push_str(plain);
        rest = remaining;

        let mut chars = rest.chars();
        match chars.next() {
            Some('"') => return Ok((chars.as_str(), out)),
            Some('\\') => match chars.next() {
                Some(c @ ('"' | '\\')) => {
                    out.push(c);
                    rest = chars.as_str();
                }
                Some(c) => {
                    out.push('\\');
                    out.push(c);
                    rest = chars.as_str();
                }
                None => break,
            },
            _ => break,
        }
    }

    Err(nom::Err::Failure(Failure {
        input,
        kind: SyntaxErrorKind::UnterminatedString,
    }))
}

fn set(input: &str) -> PResult<'_, StringSet> {
    map(
        delimited(
            pair(expected("`{`", char('{')), multispace0),
            separated_list1(multispace1, string),
            pair(
                multispace0,
                expected("`}` or whitespace between set members", char('}')),
            ),
        ),
        |values| values.into_iter().collect(),
    )(input)
}
