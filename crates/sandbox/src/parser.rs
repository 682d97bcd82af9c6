//! A `nom`-based parser for the restricted chart-spec expression language.
//!
//! The accepted surface is relaxed JSON (unquoted identifier keys, single
//! or double quotes, trailing commas) extended with arithmetic and dotted
//! call syntax for the whitelisted helpers.

use crate::ast::{BinOp, Expr};
use crate::error::SandboxError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, take_while, take_while1},
    character::complete::{alpha1, char, multispace0},
    combinator::{map, not, opt, recognize, value},
    multi::{many0, separated_list0},
    number::complete::double,
    sequence::{delimited, pair, preceded, terminated},
};

pub fn parse_expression(input: &str) -> Result<Expr, SandboxError> {
    match expression(input.trim()) {
        Ok(("", expr)) => Ok(expr),
        Ok((rem, _)) => Err(SandboxError::Parse(format!(
            "unexpected trailing input: '{}'",
            truncate(rem)
        ))),
        Err(e) => Err(SandboxError::Parse(e.to_string())),
    }
}

fn truncate(s: &str) -> &str {
    let end = s
        .char_indices()
        .nth(40)
        .map(|(idx, _)| idx)
        .unwrap_or(s.len());
    &s[..end]
}

// --- Expression grammar (sum / product / factor) ---

fn expression(input: &str) -> IResult<&str, Expr> {
    let (input, first) = term(input)?;
    let (input, rest) = many0(pair(
        ws(alt((
            value(BinOp::Add, char('+')),
            value(BinOp::Sub, char('-')),
        ))),
        term,
    ))
    .parse(input)?;
    Ok((input, fold_binary(first, rest)))
}

fn term(input: &str) -> IResult<&str, Expr> {
    let (input, first) = factor(input)?;
    let (input, rest) = many0(pair(
        ws(alt((
            value(BinOp::Mul, char('*')),
            value(BinOp::Div, char('/')),
        ))),
        factor,
    ))
    .parse(input)?;
    Ok((input, fold_binary(first, rest)))
}

fn fold_binary(first: Expr, rest: Vec<(BinOp, Expr)>) -> Expr {
    rest.into_iter().fold(first, |lhs, (op, rhs)| Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

fn factor(input: &str) -> IResult<&str, Expr> {
    ws(alt((
        map(preceded(char('-'), factor), |e| Expr::Neg(Box::new(e))),
        delimited(char('('), expression, ws(char(')'))),
        object,
        array,
        literal,
        call_or_path,
    )))
    .parse(input)
}

// --- Literals ---

fn literal(input: &str) -> IResult<&str, Expr> {
    alt((
        map(keyword("true"), |_| Expr::Literal(serde_json::json!(true))),
        map(keyword("false"), |_| Expr::Literal(serde_json::json!(false))),
        map(keyword("null"), |_| Expr::Literal(serde_json::Value::Null)),
        map(keyword("undefined"), |_| Expr::Literal(serde_json::Value::Null)),
        map(double, |n| Expr::Literal(serde_json::json!(n))),
        map(string_literal, |s| Expr::Literal(serde_json::json!(s))),
    ))
    .parse(input)
}

/// A keyword must not run into a longer identifier (`true` vs `trueish`).
fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input| {
        terminated(
            tag(word),
            not(take_while1(|c: char| {
                c.is_alphanumeric() || c == '_' || c == '$'
            })),
        )
        .parse(input)
    }
}

fn string_literal(input: &str) -> IResult<&str, String> {
    alt((single_quoted, double_quoted)).parse(input)
}

fn escape_char(input: &str) -> IResult<&str, &str> {
    alt((
        value("\n", char('n')),
        value("\t", char('t')),
        value("\\", char('\\')),
        value("'", char('\'')),
        value("\"", char('"')),
        value("/", char('/')),
    ))
    .parse(input)
}

fn single_quoted(input: &str) -> IResult<&str, String> {
    delimited(
        char('\''),
        map(
            opt(escaped_transform(is_not("\\'"), '\\', escape_char)),
            Option::unwrap_or_default,
        ),
        char('\''),
    )
    .parse(input)
}

fn double_quoted(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(is_not("\\\""), '\\', escape_char)),
            Option::unwrap_or_default,
        ),
        char('"'),
    )
    .parse(input)
}

// --- Composite constructors ---

fn array(input: &str) -> IResult<&str, Expr> {
    map(
        delimited(
            char('['),
            terminated(
                separated_list0(ws(char(',')), expression),
                opt(ws(char(','))),
            ),
            ws(char(']')),
        ),
        Expr::Array,
    )
    .parse(input)
}

fn object(input: &str) -> IResult<&str, Expr> {
    map(
        delimited(
            char('{'),
            terminated(
                separated_list0(ws(char(',')), object_entry),
                opt(ws(char(','))),
            ),
            ws(char('}')),
        ),
        Expr::Object,
    )
    .parse(input)
}

fn object_entry(input: &str) -> IResult<&str, (String, Expr)> {
    let (input, key) = ws(alt((string_literal, map(identifier, str::to_string)))).parse(input)?;
    let (input, _) = ws(char(':')).parse(input)?;
    let (input, value) = expression(input)?;
    Ok((input, (key, value)))
}

// --- Identifiers, calls, and dotted paths ---

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"), tag("$"))),
        take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '$'),
    ))
    .parse(input)
}

fn dotted_path(input: &str) -> IResult<&str, Vec<String>> {
    map(
        pair(identifier, many0(preceded(char('.'), identifier))),
        |(first, rest)| {
            let mut path = vec![first.to_string()];
            path.extend(rest.iter().map(|s| s.to_string()));
            path
        },
    )
    .parse(input)
}

fn call_or_path(input: &str) -> IResult<&str, Expr> {
    let (input, path) = dotted_path(input)?;
    let (input, args) = opt(delimited(
        ws(char('(')),
        terminated(
            separated_list0(ws(char(',')), expression),
            opt(ws(char(','))),
        ),
        ws(char(')')),
    ))
    .parse(input)?;

    Ok((
        input,
        match args {
            Some(args) => Expr::Call { path, args },
            None => Expr::Path(path),
        },
    ))
}

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_relaxed_object_literals() {
        let expr = parse_expression("{type:'bar', data: {labels: [\"a\"], datasets: [],},}").unwrap();
        match expr {
            Expr::Object(entries) => {
                assert_eq!(entries[0].0, "type");
                assert_eq!(entries[0].1, Expr::Literal(json!("bar")));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parses_arithmetic_with_precedence() {
        let expr = parse_expression("1 + 2 * 3").unwrap();
        match expr {
            Expr::Binary { op: BinOp::Add, rhs, .. } => match *rhs {
                Expr::Binary { op: BinOp::Mul, .. } => {}
                other => panic!("expected product on the right, got {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parses_helper_calls_with_dotted_paths() {
        let expr = parse_expression("pattern.draw('zigzag', '#fff')").unwrap();
        match expr {
            Expr::Call { path, args } => {
                assert_eq!(path, vec!["pattern".to_string(), "draw".to_string()]);
                assert_eq!(args.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn keywords_do_not_swallow_identifiers() {
        let expr = parse_expression("{nullable: true}").unwrap();
        match expr {
            Expr::Object(entries) => assert_eq!(entries[0].0, "nullable"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn string_escapes_are_decoded() {
        let expr = parse_expression(r#"'line one\nline two'"#).unwrap();
        assert_eq!(expr, Expr::Literal(json!("line one\nline two")));
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(parse_expression("{type:'bar'} extra").is_err());
    }
}
