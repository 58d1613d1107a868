//! Reader for Python `repr()` literals found in rows written by the older
//! pandas-based tool: lists, tuples, dicts, quoted strings, numbers, `None`,
//! `True` and `False`. Produces a `serde_json::Value` so the usual serde
//! models can take it from there.

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag},
    character::complete::{anychar, char, multispace0},
    combinator::{all_consuming, map, map_opt, opt, value},
    multi::separated_list0,
    number::complete::recognize_float,
    sequence::{delimited, preceded, separated_pair, terminated},
    IResult,
};
use serde_json::{Number, Value};

/// Parses a whole cell. Returns `None` unless the entire text is one literal.
pub fn parse_python_literal(text: &str) -> Option<Value> {
    all_consuming(literal)(text).ok().map(|(_, value)| value)
}

fn literal(input: &str) -> IResult<&str, Value> {
    delimited(
        multispace0,
        alt((
            map(sequence('[', ']'), Value::Array),
            map(sequence('(', ')'), Value::Array),
            dict,
            map(string, Value::String),
            value(Value::Null, alt((tag("None"), tag("nan")))),
            value(Value::Bool(true), tag("True")),
            value(Value::Bool(false), tag("False")),
            number,
        )),
        multispace0,
    )(input)
}

/// `[a, b]` or `(a, b)`, trailing comma allowed.
fn sequence<'a>(open: char, close: char) -> impl FnMut(&'a str) -> IResult<&'a str, Vec<Value>> {
    delimited(
        char(open),
        terminated(separated_list0(char(','), literal), opt(char(','))),
        preceded(multispace0, char(close)),
    )
}

fn dict(input: &str) -> IResult<&str, Value> {
    let key = delimited(multispace0, string, multispace0);
    map(
        delimited(
            char('{'),
            terminated(
                separated_list0(char(','), separated_pair(key, char(':'), literal)),
                opt(char(',')),
            ),
            preceded(multispace0, char('}')),
        ),
        |pairs| Value::Object(pairs.into_iter().collect()),
    )(input)
}

fn string(input: &str) -> IResult<&str, String> {
    alt((quoted('\'', "\\'"), quoted('"', "\\\"")))(input)
}

fn quoted<'a>(quote: char, stop: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, String> {
    delimited(
        char(quote),
        map(
            opt(escaped_transform(
                is_not(stop),
                '\\',
                alt((value('\n', char('n')), value('\t', char('t')), anychar)),
            )),
            Option::unwrap_or_default,
        ),
        char(quote),
    )
}

fn number(input: &str) -> IResult<&str, Value> {
    map_opt(recognize_float, |text: &str| {
        text.parse::<i64>().map(Value::from).ok().or_else(|| {
            text.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
        })
    })(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reads_string_lists() {
        assert_eq!(
            parse_python_literal(r#"['C++', "Node, js", 'it\'s']"#),
            Some(json!(["C++", "Node, js", "it's"]))
        );
        assert_eq!(parse_python_literal("['Go',]"), Some(json!(["Go"])));
        assert_eq!(parse_python_literal(" [ ] "), Some(json!([])));
        assert_eq!(parse_python_literal("['', 'x']"), Some(json!(["", "x"])));
    }

    #[test]
    fn test_reads_nested_dicts() {
        let cell = "[{'programming_languages': ['Python', 'SQL'], 'other_tools': None}]";
        assert_eq!(
            parse_python_literal(cell),
            Some(json!([{"programming_languages": ["Python", "SQL"], "other_tools": null}]))
        );
    }

    #[test]
    fn test_reads_scalars() {
        assert_eq!(
            parse_python_literal("{'years': 4.5, 'remote': True, 'count': 3}"),
            Some(json!({"years": 4.5, "remote": true, "count": 3}))
        );
    }

    #[test]
    fn test_rejects_partial_or_unquoted_input() {
        assert_eq!(parse_python_literal("[Python, 'SQL'"), None);
        assert_eq!(parse_python_literal("['a'] trailing"), None);
        assert_eq!(parse_python_literal("{'a' 'b'}"), None);
        assert_eq!(parse_python_literal("[,,]"), None);
    }
}
