//! Projection spec grammar.
//!
//! ```text
//! spec     := call | field
//! call     := NAME '(' [arg (sep arg)*] ')' [':' alias]
//! sep      := ',' | ';'                      (top level only)
//! arg      := call | 'quoted' | "quoted" | number | field
//! field    := property [':' alias] ['?' filter ('&' filter)*]
//! filter   := property '=' (value | '*')
//! ```
//!
//! Separators and parentheses inside quotes or nested calls do not split
//! arguments.

use crate::document::number_value;
use crate::error::{ProjectionError, ProjectionResult};
use serde_json::Value;

/// One parsed projection spec.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionSpec {
    Field(FieldSpec),
    Call(CallSpec),
}

impl ProjectionSpec {
    /// Parses a spec, falling back to a plain reference to the raw text
    /// when the input is malformed.
    pub fn parse_lenient(input: &str) -> Self {
        match parse_spec(input) {
            Ok(spec) => spec,
            Err(e) => {
                tracing::debug!(spec = input, error = %e, "malformed projection spec");
                Self::Field(FieldSpec::plain(input.trim()))
            }
        }
    }

    /// Key under which the spec's result appears in the output.
    pub fn output_name(&self) -> &str {
        match self {
            Self::Field(f) => f.output_name(),
            Self::Call(c) => c.output_name(),
        }
    }
}

/// A property reference, optionally renamed and conditional.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub property: String,
    pub alias: Option<String>,
    pub filters: Vec<FilterTerm>,
    /// The text the spec was parsed from.
    pub source: String,
}

impl FieldSpec {
    pub fn plain(property: &str) -> Self {
        Self {
            property: property.into(),
            alias: None,
            filters: Vec::new(),
            source: property.into(),
        }
    }

    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.property)
    }

    pub fn is_filtered(&self) -> bool {
        !self.filters.is_empty()
    }
}

/// One `property=value` condition of a filtered field.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterTerm {
    pub property: String,
    pub value: FilterValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// `*`: the property only has to be present.
    Any,
    Literal(String),
}

/// A function call with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSpec {
    /// Upper-cased function name.
    pub function: String,
    pub args: Vec<Argument>,
    pub alias: Option<String>,
    pub source: String,
}

impl CallSpec {
    /// The alias, or the call text itself when there is none.
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.source)
    }

    pub fn is_group_by(&self) -> bool {
        self.function == "GROUPBY"
    }

    /// Every field referenced by the call, nested calls included.
    pub fn field_args(&self) -> Vec<&FieldSpec> {
        let mut out = Vec::new();
        for arg in &self.args {
            match arg {
                Argument::Field(f) => out.push(f),
                Argument::Call(c) => out.extend(c.field_args()),
                Argument::Literal(_) => {}
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Call(CallSpec),
    Field(FieldSpec),
    Literal(Value),
}

/// Parses one projection spec.
pub fn parse_spec(input: &str) -> ProjectionResult<ProjectionSpec> {
    let text = input.trim();
    if text.is_empty() {
        return Err(ProjectionError::Empty);
    }
    if let Some(call) = parse_call(text)? {
        return Ok(ProjectionSpec::Call(call));
    }
    parse_field(text).map(ProjectionSpec::Field)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `Ok(None)` when the text is not shaped like a call at all.
fn parse_call(text: &str) -> ProjectionResult<Option<CallSpec>> {
    let Some(open) = text.find('(') else {
        return Ok(None);
    };
    let name = text[..open].trim();
    if !is_identifier(name) {
        return Ok(None);
    }

    let close = matching_paren(text, open)?;
    let inner = &text[open + 1..close];
    let rest = text[close + 1..].trim();
    let alias = if rest.is_empty() {
        None
    } else if let Some(alias) = rest.strip_prefix(':') {
        let alias = alias.trim();
        if alias.is_empty() {
            return Err(ProjectionError::EmptyAlias(text.into()));
        }
        Some(alias.to_string())
    } else {
        return Err(ProjectionError::TrailingInput(rest.into()));
    };

    let args = if inner.trim().is_empty() {
        Vec::new()
    } else {
        split_arguments(inner)?
            .into_iter()
            .map(parse_argument)
            .collect::<ProjectionResult<Vec<_>>>()?
    };

    Ok(Some(CallSpec {
        function: name.to_ascii_uppercase(),
        args,
        alias,
        source: text.into(),
    }))
}

/// Byte index of the `)` closing the `(` at `open`.
fn matching_paren(text: &str, open: usize) -> ProjectionResult<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices().skip_while(|(i, _)| *i < open) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            (None, _) => {}
        }
    }
    Err(ProjectionError::UnbalancedParens(text.into()))
}

/// Splits call arguments on top-level `,` and `;`.
fn split_arguments(inner: &str) -> ProjectionResult<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| ProjectionError::UnbalancedParens(inner.into()))?;
            }
            (None, ',' | ';') if depth == 0 => {
                parts.push(&inner[start..i]);
                start = i + 1;
            }
            (None, _) => {}
        }
    }
    if depth != 0 || quote.is_some() {
        return Err(ProjectionError::UnbalancedParens(inner.into()));
    }
    parts.push(&inner[start..]);

    let parts: Vec<&str> = parts.into_iter().map(str::trim).collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(ProjectionError::EmptyArgument(inner.into()));
    }
    Ok(parts)
}

fn parse_argument(text: &str) -> ProjectionResult<Argument> {
    for q in ['\'', '"'] {
        if text.len() >= 2 && text.starts_with(q) && text.ends_with(q) {
            return Ok(Argument::Literal(Value::String(text[1..text.len() - 1].into())));
        }
    }
    if let Some(call) = parse_call(text)? {
        return Ok(Argument::Call(call));
    }
    if let Ok(n) = text.parse::<f64>() {
        if n.is_finite() {
            return Ok(Argument::Literal(number_value(n)));
        }
    }
    parse_field(text).map(Argument::Field)
}

fn parse_field(text: &str) -> ProjectionResult<FieldSpec> {
    let (head, filter_part) = match text.split_once('?') {
        Some((head, filters)) => (head, Some(filters)),
        None => (text, None),
    };
    let (property, alias) = match head.split_once(':') {
        Some((property, alias)) => {
            let alias = alias.trim();
            if alias.is_empty() {
                return Err(ProjectionError::EmptyAlias(text.into()));
            }
            (property.trim(), Some(alias.to_string()))
        }
        None => (head.trim(), None),
    };
    if property.is_empty() {
        return Err(ProjectionError::EmptyProperty(text.into()));
    }

    let mut filters = Vec::new();
    if let Some(part) = filter_part {
        for term in part.split('&') {
            let (name, value) = term
                .split_once('=')
                .ok_or_else(|| ProjectionError::MalformedFilter(term.into()))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(ProjectionError::MalformedFilter(term.into()));
            }
            let value = match value.trim() {
                "*" => FilterValue::Any,
                literal => FilterValue::Literal(literal.into()),
            };
            filters.push(FilterTerm {
                property: name.into(),
                value,
            });
        }
    }

    Ok(FieldSpec {
        property: property.into(),
        alias,
        filters,
        source: text.into(),
    })
}
