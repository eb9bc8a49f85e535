//! Storage-agnostic filter queries.
//!
//! A [`DataQuery`] is a flat sequence of terms: filters over physical
//! fields, AND/OR joins, and group markers. Providers may translate the
//! sequence into their own query language or evaluate it directly with
//! [`DataQuery::matches`].
//!
//! Evaluation rules:
//! - AND binds tighter than OR
//! - two filters (or groups) with no join between them are ANDed
//! - an empty query matches every record

use maxdata_model::Record;
use maxdata_types::DataValue;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Comparison applied by a filter term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equal,
    GreaterThan,
    LessThan,
    IsNull,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Equal => "=",
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::IsNull => "is null",
        })
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "=" | "==" => Ok(Self::Equal),
            ">" => Ok(Self::GreaterThan),
            "<" => Ok(Self::LessThan),
            "is null" => Ok(Self::IsNull),
            other => Err(format!("unknown operator: {other}")),
        }
    }
}

/// Boolean join between two terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[default]
    And,
    Or,
}

/// One `field <op> value` predicate over a physical field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub operator: Operator,
    /// Ignored for [`Operator::IsNull`].
    pub value: DataValue,
}

impl Filter {
    pub fn new(field: &str, operator: Operator, value: impl Into<DataValue>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Evaluates the predicate against one record.
    ///
    /// Missing fields and unset sentinels count as null. Equality falls back
    /// to the canonical string form when the kinds are not comparable.
    pub fn matches(&self, record: &Record) -> bool {
        let actual = record.get(&self.field).filter(|v| !v.is_unset());
        match (self.operator, actual) {
            (Operator::IsNull, actual) => actual.is_none(),
            (_, None) => false,
            (Operator::Equal, Some(actual)) => match actual.compare(&self.value) {
                Some(ordering) => ordering == Ordering::Equal,
                None => actual.to_string() == self.value.to_string(),
            },
            (Operator::GreaterThan, Some(actual)) => {
                actual.compare(&self.value) == Some(Ordering::Greater)
            }
            (Operator::LessThan, Some(actual)) => actual.compare(&self.value) == Some(Ordering::Less),
        }
    }
}

/// A single element of a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "term", rename_all = "snake_case")]
pub enum QueryTerm {
    Filter(Filter),
    Join { condition: Condition },
    GroupStart,
    GroupEnd,
}

/// A structured boolean filter over physical fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataQuery {
    terms: Vec<QueryTerm>,
}

impl DataQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// A query with a single equality term.
    pub fn equal(field: &str, value: impl Into<DataValue>) -> Self {
        Self::new().and(field, Operator::Equal, value)
    }

    pub fn terms(&self) -> &[QueryTerm] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Appends a filter joined to what precedes it with AND.
    #[must_use]
    pub fn and(mut self, field: &str, operator: Operator, value: impl Into<DataValue>) -> Self {
        self.join(Condition::And);
        self.terms.push(QueryTerm::Filter(Filter::new(field, operator, value)));
        self
    }

    /// Appends a filter joined to what precedes it with OR.
    #[must_use]
    pub fn or(mut self, field: &str, operator: Operator, value: impl Into<DataValue>) -> Self {
        self.join(Condition::Or);
        self.terms.push(QueryTerm::Filter(Filter::new(field, operator, value)));
        self
    }

    /// Opens a parenthesized group joined to what precedes it.
    #[must_use]
    pub fn group_start(mut self, condition: Condition) -> Self {
        self.join(condition);
        self.terms.push(QueryTerm::GroupStart);
        self
    }

    #[must_use]
    pub fn group_end(mut self) -> Self {
        self.terms.push(QueryTerm::GroupEnd);
        self
    }

    /// Pushes a raw term without inserting any join.
    pub fn push(&mut self, term: QueryTerm) {
        self.terms.push(term);
    }

    /// ANDs `group` onto this query as one parenthesized group.
    ///
    /// Used to combine an entity's standing base predicate with a
    /// caller-supplied filter. An empty group leaves the query unchanged.
    pub fn append_group(&mut self, group: DataQuery) {
        if group.is_empty() {
            return;
        }
        self.join(Condition::And);
        self.terms.push(QueryTerm::GroupStart);
        self.terms.extend(group.terms);
        self.terms.push(QueryTerm::GroupEnd);
    }

    /// Physical fields referenced by any filter term.
    pub fn fields(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for term in &self.terms {
            if let QueryTerm::Filter(f) = term {
                if !out.contains(&f.field.as_str()) {
                    out.push(&f.field);
                }
            }
        }
        out
    }

    /// Evaluates the query against one record.
    pub fn matches(&self, record: &Record) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        let mut eval = Evaluator {
            terms: &self.terms,
            pos: 0,
            record,
        };
        let result = eval.or_expr();
        if eval.pos < self.terms.len() {
            warn!(position = eval.pos, "unbalanced query terms ignored");
        }
        result
    }

    fn join(&mut self, condition: Condition) {
        match self.terms.last() {
            None | Some(QueryTerm::GroupStart | QueryTerm::Join { .. }) => {}
            Some(QueryTerm::Filter(_) | QueryTerm::GroupEnd) => {
                self.terms.push(QueryTerm::Join { condition });
            }
        }
    }
}

/// Recursive-descent evaluation over the flat term list.
///
/// ```text
/// or_expr  := and_expr (OR and_expr)*
/// and_expr := atom ((AND)? atom)*
/// atom     := GroupStart or_expr GroupEnd | Filter
/// ```
struct Evaluator<'a> {
    terms: &'a [QueryTerm],
    pos: usize,
    record: &'a Record,
}

impl Evaluator<'_> {
    fn or_expr(&mut self) -> bool {
        let mut result = self.and_expr();
        while let Some(QueryTerm::Join {
            condition: Condition::Or,
        }) = self.terms.get(self.pos)
        {
            self.pos += 1;
            let rhs = self.and_expr();
            result = result || rhs;
        }
        result
    }

    fn and_expr(&mut self) -> bool {
        let mut result = self.atom();
        loop {
            match self.terms.get(self.pos) {
                Some(QueryTerm::Join {
                    condition: Condition::And,
                }) => {
                    self.pos += 1;
                }
                Some(QueryTerm::Filter(_) | QueryTerm::GroupStart) => {}
                _ => return result,
            }
            let rhs = self.atom();
            result = result && rhs;
        }
    }

    fn atom(&mut self) -> bool {
        match self.terms.get(self.pos) {
            Some(QueryTerm::GroupStart) => {
                self.pos += 1;
                let inner = self.or_expr();
                if let Some(QueryTerm::GroupEnd) = self.terms.get(self.pos) {
                    self.pos += 1;
                }
                inner
            }
            Some(QueryTerm::Filter(filter)) => {
                self.pos += 1;
                filter.matches(self.record)
            }
            // An empty group or a dangling join matches.
            _ => true,
        }
    }
}

/// One caller-supplied filter entry, expressed on logical property names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterEntry {
    pub property: String,
    pub operator: Operator,
    pub value: DataValue,
    /// Opens a group before this entry.
    #[serde(default)]
    pub start_group: bool,
    /// Closes a group after this entry.
    #[serde(default)]
    pub end_group: bool,
    /// How this entry joins the previous one; AND when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl FilterEntry {
    pub fn new(property: &str, operator: Operator, value: impl Into<DataValue>) -> Self {
        Self {
            property: property.into(),
            operator,
            value: value.into(),
            start_group: false,
            end_group: false,
            condition: None,
        }
    }

    #[must_use]
    pub fn or(mut self) -> Self {
        self.condition = Some(Condition::Or);
        self
    }

    #[must_use]
    pub fn start_group(mut self) -> Self {
        self.start_group = true;
        self
    }

    #[must_use]
    pub fn end_group(mut self) -> Self {
        self.end_group = true;
        self
    }
}

/// An ordered list of caller filter entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterIndex {
    entries: Vec<FilterEntry>,
}

impl FilterIndex {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, entry: FilterEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn push(&mut self, entry: FilterEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Translates the entries into a query over physical fields.
    ///
    /// `resolve` maps a property to its single physical field. `None` when
    /// any entry's property does not resolve: such a filter matches nothing,
    /// and dropping the entry instead would widen the query.
    pub fn to_query(&self, resolve: impl Fn(&str) -> Option<String>) -> Option<DataQuery> {
        let mut query = DataQuery::new();
        let mut pending_join = false;
        for entry in &self.entries {
            let Some(field) = resolve(&entry.property) else {
                warn!(property = %entry.property, "filter property does not resolve to a field; filter matches nothing");
                return None;
            };
            if pending_join {
                query.push(QueryTerm::Join {
                    condition: entry.condition.unwrap_or_default(),
                });
            }
            if entry.start_group {
                query.push(QueryTerm::GroupStart);
            }
            query.push(QueryTerm::Filter(Filter {
                field,
                operator: entry.operator,
                value: entry.value.clone(),
            }));
            if entry.end_group {
                query.push(QueryTerm::GroupEnd);
            }
            pending_join = true;
        }
        Some(query)
    }
}

impl FromIterator<FilterEntry> for FilterIndex {
    fn from_iter<I: IntoIterator<Item = FilterEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
