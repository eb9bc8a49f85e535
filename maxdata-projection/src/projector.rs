//! Entity projection (`map_index`) and list merging/aggregation
//! (`map_index_list`).

use crate::aggregate::{self, AggregateState};
use crate::document::{number_value, text_of, to_json, Document};
use crate::functions;
use crate::spec::{CallSpec, FieldSpec, FilterValue, ProjectionSpec};
use maxdata_model::{DATA_KEY_FIELD, Entity, EntityRegistry, FieldType};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// Reserved key holding per-row documents when detail is requested.
pub const DETAIL_KEY: &str = "_Detail";

/// Options for [`Projector::map_index_list`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionOptions {
    /// Keep each merged row's own documents under [`DETAIL_KEY`].
    pub include_detail: bool,
}

/// Reading of one property from an entity.
enum FieldRead {
    Value(Value),
    /// Declared and stored, but holding its unset sentinel.
    Unset,
    /// Unknown property, or not loaded into the record.
    Missing,
}

/// The parsed form of a spec list.
struct Plan {
    fields: Vec<FieldSpec>,
    calls: Vec<CallSpec>,
    /// Call argument fields that are not also requested outputs.
    hidden: Vec<FieldSpec>,
}

impl Plan {
    fn new(entity: &Entity, specs: &[impl AsRef<str>]) -> Self {
        let parsed: Vec<ProjectionSpec> = if specs.is_empty() {
            entity
                .descriptor()
                .declared_properties()
                .into_iter()
                .filter(|(_, ty)| *ty != FieldType::Document)
                .map(|(name, _)| ProjectionSpec::Field(FieldSpec::plain(name)))
                .collect()
        } else {
            specs
                .iter()
                .map(|s| ProjectionSpec::parse_lenient(s.as_ref()))
                .collect()
        };

        let mut fields = Vec::new();
        let mut calls = Vec::new();
        for spec in parsed {
            match spec {
                ProjectionSpec::Field(f) => fields.push(f),
                ProjectionSpec::Call(c) => calls.push(c),
            }
        }

        let mut hidden: Vec<FieldSpec> = Vec::new();
        for call in &calls {
            for arg in call.field_args() {
                let name = arg.output_name();
                let requested = fields.iter().any(|f| f.output_name() == name);
                if !requested && !hidden.iter().any(|h| h.output_name() == name) {
                    hidden.push(arg.clone());
                }
            }
        }

        Self {
            fields,
            calls,
            hidden,
        }
    }

    fn has_filters(&self) -> bool {
        self.fields.iter().any(FieldSpec::is_filtered)
    }

    fn group_by(&self) -> impl Iterator<Item = &CallSpec> {
        self.calls.iter().filter(|c| c.is_group_by())
    }

    fn strip_hidden(&self, doc: &mut Document) {
        for h in &self.hidden {
            doc.shift_remove(h.output_name());
        }
    }
}

/// Projects entities into ordered JSON documents.
#[derive(Debug, Clone)]
pub struct Projector {
    registry: Arc<EntityRegistry>,
}

impl Projector {
    pub fn new(registry: Arc<EntityRegistry>) -> Self {
        Self { registry }
    }

    /// Projects one entity.
    ///
    /// Empty `specs` project every declared property except nested
    /// documents. Function specs are evaluated against the projected
    /// fields (aggregates see only this row). When any field spec carries
    /// a filter and none of them passes, the result is empty.
    pub fn map_index(&self, entity: &Entity, specs: &[impl AsRef<str>]) -> Document {
        let plan = Plan::new(entity, specs);
        let Some(mut row) = self.project_fields(entity, &plan) else {
            return Document::new();
        };

        let mut out = Document::new();
        for call in &plan.calls {
            if let Some(value) = functions::evaluate(call, &row) {
                out.insert(call.output_name().into(), value);
            }
        }
        plan.strip_hidden(&mut row);

        // Fields first, in request order, then function results.
        let mut doc = row;
        doc.extend(out);
        doc
    }

    /// Projects a list of entities, merging and aggregating when the specs
    /// contain function calls.
    ///
    /// - no calls: one document per entity
    /// - calls without `GROUPBY`: rows are merged by record key (or, when
    ///   filtered fields exist, by the values of the unfiltered fields) and
    ///   every call is evaluated once per merged row
    /// - with `GROUPBY`: merged rows are grouped by the concatenated
    ///   `GROUPBY` values and every call is folded per group
    ///
    /// Rows emptied by the filter rule are skipped.
    pub fn map_index_list(
        &self,
        entities: &[Entity],
        specs: &[impl AsRef<str>],
        options: ProjectionOptions,
    ) -> Vec<Document> {
        let Some(first) = entities.first() else {
            return Vec::new();
        };
        let plan = Plan::new(first, specs);

        if plan.calls.is_empty() {
            return entities
                .iter()
                .filter_map(|e| self.project_fields(e, &plan))
                .collect();
        }

        let merged = self.merge_rows(entities, &plan);
        trace!(rows = entities.len(), merged = merged.len(), "merged projection rows");

        let mut out = if plan.group_by().next().is_some() {
            Self::group_rows(&plan, merged, options)
        } else {
            merged
                .into_iter()
                .map(|(row, detail)| {
                    let mut acc = visible(&plan, &row);
                    let mut state = AggregateState::default();
                    for call in &plan.calls {
                        aggregate::fold(&mut acc, &mut state, call.output_name(), &row, call);
                    }
                    if options.include_detail {
                        acc.insert(DETAIL_KEY.into(), Value::Array(detail));
                    }
                    acc
                })
                .collect::<Vec<_>>()
        };

        for doc in &mut out {
            plan.strip_hidden(doc);
        }
        out
    }

    // ── Rows ─────────────────────────────────────────────────────

    /// Projects the requested fields plus hidden call arguments.
    ///
    /// `None` when the filter rule empties the row.
    fn project_fields(&self, entity: &Entity, plan: &Plan) -> Option<Document> {
        let mut doc = Document::new();
        let mut passed = false;

        for spec in &plan.fields {
            if spec.is_filtered() {
                if !self.filters_pass(entity, spec) {
                    continue;
                }
                passed = true;
            }
            match self.read(entity, &spec.property) {
                FieldRead::Value(v) => {
                    doc.insert(spec.output_name().into(), v);
                }
                FieldRead::Unset => {}
                FieldRead::Missing => {
                    doc.entry(spec.output_name()).or_insert_with(|| Value::String(String::new()));
                }
            }
        }

        if plan.has_filters() && !passed {
            return None;
        }

        for spec in &plan.hidden {
            if spec.is_filtered() && !self.filters_pass(entity, spec) {
                continue;
            }
            if let FieldRead::Value(v) = self.read(entity, &spec.property) {
                doc.insert(spec.output_name().into(), v);
            }
        }
        Some(doc)
    }

    fn filters_pass(&self, entity: &Entity, spec: &FieldSpec) -> bool {
        spec.filters.iter().all(|term| {
            let actual = self.registry.property_value(entity, &term.property);
            match (&term.value, actual) {
                (_, None) => false,
                (FilterValue::Any, Some(_)) => true,
                (FilterValue::Literal(literal), Some(v)) => v.matches_literal(literal),
            }
        })
    }

    fn read(&self, entity: &Entity, property: &str) -> FieldRead {
        let descriptor = entity.descriptor();
        let resolved = self.registry.resolve_field(descriptor, property);
        if resolved.is_empty() {
            if property == DATA_KEY_FIELD {
                return match self.registry.data_key(entity) {
                    Some(key) => FieldRead::Value(Value::String(key)),
                    None => FieldRead::Missing,
                };
            }
            return FieldRead::Missing;
        }
        if resolved.contains('\t') {
            return match self.registry.property_value(entity, property) {
                Some(v) => to_json(&v).map_or(FieldRead::Unset, FieldRead::Value),
                None => FieldRead::Missing,
            };
        }
        match entity.get(&resolved) {
            None => FieldRead::Missing,
            Some(v) => to_json(v).map_or(FieldRead::Unset, FieldRead::Value),
        }
    }

    /// Merges rows sharing a merge key. Returns each merged row with the
    /// visible per-row documents it absorbed.
    fn merge_rows(&self, entities: &[Entity], plan: &Plan) -> Vec<(Document, Vec<Value>)> {
        let mut rows: Vec<(Document, Vec<Value>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (i, entity) in entities.iter().enumerate() {
            let Some(row) = self.project_fields(entity, plan) else {
                continue;
            };
            let key = if plan.has_filters() {
                plan.fields
                    .iter()
                    .filter(|f| !f.is_filtered())
                    .map(|f| row.get(f.output_name()).map(text_of).unwrap_or_default())
                    .collect::<Vec<_>>()
                    .join("\t")
            } else {
                self.registry
                    .data_key(entity)
                    .unwrap_or_else(|| format!("\u{0}row{i}"))
            };

            let detail = Value::Object(visible(plan, &row));
            match index.get(&key) {
                Some(&at) => {
                    let (target, details) = &mut rows[at];
                    merge_into(target, row);
                    details.push(detail);
                }
                None => {
                    index.insert(key, rows.len());
                    rows.push((row, vec![detail]));
                }
            }
        }
        rows
    }

    fn group_rows(
        plan: &Plan,
        rows: Vec<(Document, Vec<Value>)>,
        options: ProjectionOptions,
    ) -> Vec<Document> {
        let mut groups: Vec<(Document, AggregateState)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (row, detail) in rows {
            let key: String = plan.group_by().map(|g| aggregate::group_key(g, &row)).collect();
            let at = *index.entry(key).or_insert_with(|| {
                groups.push((Document::new(), AggregateState::default()));
                groups.len() - 1
            });
            let (acc, state) = &mut groups[at];

            for (name, value) in visible(plan, &row) {
                acc.entry(name).or_insert(value);
            }
            for call in &plan.calls {
                aggregate::fold(acc, state, call.output_name(), &row, call);
            }
            if options.include_detail {
                if let Value::Array(items) = acc.entry(DETAIL_KEY).or_insert_with(|| Value::Array(Vec::new())) {
                    items.extend(detail);
                }
            }
        }
        groups.into_iter().map(|(acc, _)| acc).collect()
    }
}

/// The row without hidden call arguments.
fn visible(plan: &Plan, row: &Document) -> Document {
    let mut doc = row.clone();
    plan.strip_hidden(&mut doc);
    doc
}

/// Folds `row` into `target`: numbers add, text lists union, anything else
/// keeps the first value seen.
fn merge_into(target: &mut Document, row: Document) {
    for (name, value) in row {
        match target.get_mut(&name) {
            None => {
                target.insert(name, value);
            }
            Some(existing) => {
                if existing.is_number() && value.is_number() {
                    if let (Some(a), Some(b)) = (existing.as_f64(), value.as_f64()) {
                        *existing = number_value(a + b);
                    }
                } else if let (Value::Array(items), Value::Array(incoming)) = (existing, value) {
                    for item in incoming {
                        if !items.contains(&item) {
                            items.push(item);
                        }
                    }
                }
            }
        }
    }
}
