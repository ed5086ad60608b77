// ABOUTME: Tokenizer and parser for AT parameter lists with nested groups, strings and ranges
// ABOUTME: Provides lossless parse/stringify of parameter bodies such as `1,,(0-4),"a,b"`

use crate::codec::ParseError;
use std::fmt;

/// A single value inside an AT command or response parameter list
///
/// Nesting is non-uniform: a `List` may contain any mix of the other
/// variants, including further lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    /// A bare base-10 integer, e.g. `24`
    Integer(i64),
    /// A string literal; stored without its surrounding quotes
    String(String),
    /// A parenthesized group, e.g. `(0,1)`
    List(Vec<Parameter>),
    /// An integer range, written `(low-high)` on the wire
    Range { low: i64, high: i64 },
    /// An elided slot between two separators
    Empty,
}

impl Parameter {
    /// Returns the integer value, if this is an `Integer`
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Parameter::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the string value, if this is a `String`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Parameter::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the nested parameters, if this is a `List`
    pub fn as_list(&self) -> Option<&[Parameter]> {
        match self {
            Parameter::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns true for an elided slot
    pub fn is_empty(&self) -> bool {
        matches!(self, Parameter::Empty)
    }
}

impl From<i64> for Parameter {
    fn from(value: i64) -> Self {
        Parameter::Integer(value)
    }
}

impl From<&str> for Parameter {
    fn from(value: &str) -> Self {
        Parameter::String(value.to_owned())
    }
}

impl From<String> for Parameter {
    fn from(value: String) -> Self {
        Parameter::String(value)
    }
}

impl From<Vec<Parameter>> for Parameter {
    fn from(items: Vec<Parameter>) -> Self {
        Parameter::List(items)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::Integer(value) => write!(f, "{value}"),
            Parameter::String(value) => write!(f, "\"{value}\""),
            Parameter::List(items) => write!(f, "({})", join(items)),
            Parameter::Range { low, high } => write!(f, "({low}-{high})"),
            Parameter::Empty => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Separator,
    Literal(String),
}

/// Parse a raw parameter body into a typed parameter list
///
/// Empty slots between consecutive separators decode to `Parameter::Empty`.
/// Unbalanced brackets fail with `ParseError::MalformedParameterList`.
///
/// ```
/// use hayes::datatypes::Parameter;
///
/// let params = hayes::datatypes::parse_parameters("1,2,(3,4),\"a,b\"").unwrap();
/// assert_eq!(
///     params,
///     vec![
///         Parameter::Integer(1),
///         Parameter::Integer(2),
///         Parameter::List(vec![Parameter::Integer(3), Parameter::Integer(4)]),
///         Parameter::String("a,b".to_string()),
///     ]
/// );
/// ```
pub fn parse_parameters(text: &str) -> Result<Vec<Parameter>, ParseError> {
    let tokens = tokenize(text.trim())?;
    fold(&tokens)
}

/// Stringify a top-level parameter list for the wire
///
/// A lone string parameter is emitted bare, without quotes, so that
/// free-text responses survive a parse/stringify round trip unchanged.
pub fn stringify_parameters(params: &[Parameter]) -> String {
    if let [Parameter::String(value)] = params {
        return value.clone();
    }
    join(params)
}

fn join(params: &[Parameter]) -> String {
    params
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut in_quotes = false;

    for c in text.chars() {
        if in_quotes {
            literal.push(c);
            if c == '"' {
                in_quotes = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                literal.push(c);
            }
            '(' | ')' | ',' => {
                flush_literal(&mut literal, &mut tokens);
                tokens.push(match c {
                    '(' => Token::Open,
                    ')' => Token::Close,
                    _ => Token::Separator,
                });
            }
            _ => literal.push(c),
        }
    }

    if in_quotes {
        return Err(ParseError::UnterminatedString);
    }
    flush_literal(&mut literal, &mut tokens);
    Ok(tokens)
}

fn flush_literal(literal: &mut String, tokens: &mut Vec<Token>) {
    let trimmed = literal.trim();
    if !trimmed.is_empty() {
        tokens.push(Token::Literal(trimmed.to_owned()));
    }
    literal.clear();
}

fn fold(tokens: &[Token]) -> Result<Vec<Parameter>, ParseError> {
    let mut params = Vec::new();
    if tokens.is_empty() {
        return Ok(params);
    }

    let mut slot: Option<Parameter> = None;
    let mut i = 0;
    while i < tokens.len() {
        match &tokens[i] {
            Token::Separator => params.push(slot.take().unwrap_or(Parameter::Empty)),
            Token::Literal(text) => occupy(&mut slot, classify(text)?)?,
            Token::Open => {
                let close = matching_close(tokens, i)?;
                occupy(&mut slot, group(&tokens[i + 1..close])?)?;
                i = close;
            }
            Token::Close => return Err(ParseError::malformed("unexpected ')'")),
        }
        i += 1;
    }
    params.push(slot.take().unwrap_or(Parameter::Empty));

    Ok(params)
}

fn occupy(slot: &mut Option<Parameter>, value: Parameter) -> Result<(), ParseError> {
    if slot.is_some() {
        return Err(ParseError::malformed(
            "more than one value between separators",
        ));
    }
    *slot = Some(value);
    Ok(())
}

fn matching_close(tokens: &[Token], open: usize) -> Result<usize, ParseError> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        match token {
            Token::Open => depth += 1,
            Token::Close => {
                depth -= 1;
                if depth == 0 {
                    return Ok(index);
                }
            }
            _ => {}
        }
    }
    Err(ParseError::malformed("unbalanced '('"))
}

fn group(inner: &[Token]) -> Result<Parameter, ParseError> {
    // `(low-high)` is the wire form of a range, not a one-element list
    if let [Token::Literal(text)] = inner {
        if let Some((low, high)) = parse_range(text) {
            return Ok(Parameter::Range { low, high });
        }
    }
    Ok(Parameter::List(fold(inner)?))
}

fn classify(text: &str) -> Result<Parameter, ParseError> {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        return Ok(Parameter::String(text[1..text.len() - 1].to_owned()));
    }
    if text.contains('"') {
        return Err(ParseError::malformed(format!(
            "text outside quotes in {text:?}"
        )));
    }
    if let Ok(value) = text.parse::<i64>() {
        return Ok(Parameter::Integer(value));
    }
    if let Some((low, high)) = parse_range(text) {
        return Ok(Parameter::Range { low, high });
    }
    Ok(Parameter::String(text.to_owned()))
}

fn parse_range(text: &str) -> Option<(i64, i64)> {
    let (low, high) = text.split_once('-')?;
    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(low) || !is_digits(high) {
        return None;
    }
    Some((low.parse().ok()?, high.parse().ok()?))
}
