use crate::{instance::Instance, session::Session};

use maquette_core::{stmt::Value, Error, Result};

use std::sync::Arc;

/// An unexecuted query against a session.
///
/// Nothing is parsed or sent to the row source until [`all`](Self::all) or
/// [`single`](Self::single) runs it.
#[derive(Debug)]
pub struct Query<'a> {
    session: &'a Session,
    text: String,
}

impl<'a> Query<'a> {
    pub(crate) fn new(session: &'a Session, text: impl Into<String>) -> Self {
        Self {
            session,
            text: text.into(),
        }
    }

    /// Execute, returning all matches in ascending identifier order.
    pub async fn all(self) -> Result<Vec<Arc<Instance>>> {
        self.session.query_all(&self.text).await
    }

    /// Execute, expecting exactly one match.
    pub async fn single(self) -> Result<Arc<Instance>> {
        let mut all = self.session.query_all(&self.text).await?;
        match all.len() {
            0 => Err(Error::record_not_found(format!(
                "query returned no results: {}",
                self.text
            ))),
            1 => Ok(all.remove(0)),
            found => Err(Error::too_many_records(format!(
                "expected 1 record, found {found}: {}",
                self.text
            ))),
        }
    }
}

/// Parsed form of the restricted query grammar:
///
/// ```text
/// from <Entity> [where <field> = <literal>]
/// ```
///
/// Literals are single-quoted strings, integers, or `true`/`false`. No
/// joins, no projections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedQuery {
    pub(crate) entity: String,
    pub(crate) filter: Option<(String, Value)>,
}

pub(crate) fn parse(text: &str) -> Result<ParsedQuery> {
    let (keyword, rest) = take_word(text);
    if !keyword.eq_ignore_ascii_case("from") {
        return Err(Error::query_syntax(format!(
            "expected `from`, found `{keyword}`"
        )));
    }

    let (entity, rest) = take_word(rest);
    if !is_ident(entity) {
        return Err(Error::query_syntax("expected an entity name after `from`"));
    }

    if rest.is_empty() {
        return Ok(ParsedQuery {
            entity: entity.to_string(),
            filter: None,
        });
    }

    let (keyword, clause) = take_word(rest);
    if !keyword.eq_ignore_ascii_case("where") {
        return Err(Error::query_syntax(format!(
            "unsupported clause `{keyword}`"
        )));
    }

    let Some((field, literal)) = clause.split_once('=') else {
        return Err(Error::query_syntax("expected `=` in where clause"));
    };

    let field = field.trim();
    if !is_ident(field) {
        return Err(Error::query_syntax("expected a field name in where clause"));
    }

    Ok(ParsedQuery {
        entity: entity.to_string(),
        filter: Some((field.to_string(), parse_literal(literal.trim())?)),
    })
}

fn parse_literal(literal: &str) -> Result<Value> {
    if let Some(inner) = literal.strip_prefix('\'') {
        let Some(inner) = inner.strip_suffix('\'') else {
            return Err(Error::query_syntax("unterminated string literal"));
        };
        if inner.contains('\'') {
            return Err(Error::query_syntax("string literals may not contain quotes"));
        }
        return Ok(Value::from(inner));
    }

    if literal.eq_ignore_ascii_case("true") {
        return Ok(Value::Bool(true));
    }
    if literal.eq_ignore_ascii_case("false") {
        return Ok(Value::Bool(false));
    }

    literal
        .parse::<i64>()
        .map(Value::I64)
        .map_err(|_| Error::query_syntax(format!("unsupported literal `{literal}`")))
}

/// Split the leading word off a string, trimming surrounding whitespace.
fn take_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(at) => (&s[..at], s[at..].trim_start()),
        None => (s, ""),
    }
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
