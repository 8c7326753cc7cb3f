

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Value, json};
use tracing::debug;

use super::client::{DocumentStore, FindOptions, ReturnDocument, SortOrder, StoreError, UpdateResult};
use super::filter::{Document, Filter, Update};
use super::ids::ObjectId;
use super::pipeline::Pipeline;


/// In-process document store.
///
/// Implements the filter and update semantics the overlay depends on, notably
/// that `{"$ne": true}` matches documents where the field is absent.
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    offline: AtomicBool,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            offline: AtomicBool::new(false),
        }
    }

    /// Raw contents of a collection, bypassing every filter.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .read()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// While offline every operation fails with `StoreError::Connection`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Connection("in-memory store is offline".to_string()));
        }
        Ok(())
    }

    fn select(
        docs: &[Document],
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let mut selected = Vec::new();
        for doc in docs {
            if matches(doc, filter.as_document())? {
                selected.push(doc.clone());
            }
        }
        if let Some((field, order)) = &options.sort {
            sort_documents(&mut selected, &[(field.clone(), *order)]);
        }
        let skip = options.skip.unwrap_or(0);
        let limit = options.limit.unwrap_or(usize::MAX);
        Ok(selected.into_iter().skip(skip).take(limit).collect())
    }

    fn first_match(docs: &[Document], filter: &Filter) -> Result<Option<usize>, StoreError> {
        for (i, doc) in docs.iter().enumerate() {
            if matches(doc, filter.as_document())? {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert_one(&self, collection: &str, mut doc: Document) -> Result<(), StoreError> {
        self.ensure_online()?;
        let id = doc
            .entry("_id".to_string())
            .or_insert_with(|| ObjectId::new().into())
            .clone();

        let mut collections = self.collections.write();
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.iter().any(|d| d.get("_id") == Some(&id)) {
            return Err(StoreError::DuplicateKey(format!("_id {} in {}", id, collection)));
        }
        debug!("Inserted document {} into {}", id, collection);
        docs.push(doc);
        Ok(())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        self.ensure_online()?;
        let collections = self.collections.read();
        match collections.get(collection) {
            Some(docs) => Self::select(docs, filter, options),
            None => Ok(Vec::new()),
        }
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Option<Document>, StoreError> {
        let options = FindOptions {
            limit: Some(1),
            ..options.clone()
        };
        Ok(self.find(collection, filter, &options).await?.into_iter().next())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        Ok(self
            .find(collection, filter, &FindOptions::default())
            .await?
            .len() as u64)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateResult, StoreError> {
        self.ensure_online()?;
        let mut collections = self.collections.write();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(UpdateResult::default());
        };
        match Self::first_match(docs, filter)? {
            Some(i) => {
                let modified = apply_update(&mut docs[i], update);
                Ok(UpdateResult {
                    matched_count: 1,
                    modified_count: u64::from(modified),
                })
            }
            None => Ok(UpdateResult::default()),
        }
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateResult, StoreError> {
        self.ensure_online()?;
        let mut collections = self.collections.write();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(UpdateResult::default());
        };
        let mut result = UpdateResult::default();
        for doc in docs.iter_mut() {
            if matches(doc, filter.as_document())? {
                result.matched_count += 1;
                if apply_update(doc, update) {
                    result.modified_count += 1;
                }
            }
        }
        Ok(result)
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
        return_document: ReturnDocument,
    ) -> Result<Option<Document>, StoreError> {
        self.ensure_online()?;
        let mut collections = self.collections.write();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(i) = Self::first_match(docs, filter)? else {
            return Ok(None);
        };
        let before = docs[i].clone();
        apply_update(&mut docs[i], update);
        Ok(Some(match return_document {
            ReturnDocument::Before => before,
            ReturnDocument::After => docs[i].clone(),
        }))
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        mut doc: Document,
    ) -> Result<UpdateResult, StoreError> {
        self.ensure_online()?;
        let mut collections = self.collections.write();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(UpdateResult::default());
        };
        let Some(i) = Self::first_match(docs, filter)? else {
            return Ok(UpdateResult::default());
        };
        if let Some(id) = docs[i].get("_id").cloned() {
            doc.insert("_id".to_string(), id);
        }
        let modified = docs[i] != doc;
        docs[i] = doc;
        Ok(UpdateResult {
            matched_count: 1,
            modified_count: u64::from(modified),
        })
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> Result<Vec<Document>, StoreError> {
        self.ensure_online()?;
        let mut docs = self.documents(collection);
        for stage in pipeline.stages() {
            docs = run_stage(docs, stage)?;
        }
        Ok(docs)
    }
}


fn run_stage(docs: Vec<Document>, stage: &Document) -> Result<Vec<Document>, StoreError> {
    let Some((op, arg)) = stage.iter().next() else {
        return Err(StoreError::Query("empty pipeline stage".to_string()));
    };
    match op.as_str() {
        "$match" => {
            let filter = arg
                .as_object()
                .ok_or_else(|| StoreError::Query("$match expects an object".to_string()))?;
            let mut out = Vec::with_capacity(docs.len());
            for doc in docs {
                if matches(&doc, filter)? {
                    out.push(doc);
                }
            }
            Ok(out)
        }
        "$sort" => {
            let directions = arg
                .as_object()
                .ok_or_else(|| StoreError::Query("$sort expects an object".to_string()))?;
            let keys: Vec<(String, SortOrder)> = directions
                .iter()
                .map(|(field, dir)| {
                    let order = if dir.as_i64() == Some(-1) {
                        SortOrder::Descending
                    } else {
                        SortOrder::Ascending
                    };
                    (field.clone(), order)
                })
                .collect();
            let mut docs = docs;
            sort_documents(&mut docs, &keys);
            Ok(docs)
        }
        "$skip" => {
            let n = stage_count(op, arg)?;
            Ok(docs.into_iter().skip(n).collect())
        }
        "$limit" => {
            let n = stage_count(op, arg)?;
            Ok(docs.into_iter().take(n).collect())
        }
        "$count" => {
            let name = arg
                .as_str()
                .ok_or_else(|| StoreError::Query("$count expects a field name".to_string()))?;
            if docs.is_empty() {
                return Ok(Vec::new());
            }
            let mut out = Document::new();
            out.insert(name.to_string(), json!(docs.len()));
            Ok(vec![out])
        }
        "$project" => {
            let projection = arg
                .as_object()
                .ok_or_else(|| StoreError::Query("$project expects an object".to_string()))?;
            Ok(docs.into_iter().map(|doc| project(doc, projection)).collect())
        }
        other => Err(StoreError::Query(format!("unsupported pipeline stage {}", other))),
    }
}

fn stage_count(op: &str, arg: &Value) -> Result<usize, StoreError> {
    arg.as_u64()
        .map(|n| n as usize)
        .ok_or_else(|| StoreError::Query(format!("{} expects a non-negative integer", op)))
}

fn project(doc: Document, projection: &Document) -> Document {
    let included = |v: &Value| v.as_bool().unwrap_or_else(|| v.as_i64() != Some(0));
    let inclusive = projection
        .iter()
        .any(|(field, v)| field != "_id" && included(v));

    if inclusive {
        let keep_id = projection.get("_id").is_none_or(included);
        doc.into_iter()
            .filter(|(field, _)| {
                if field == "_id" {
                    keep_id
                } else {
                    projection.get(field).is_some_and(included)
                }
            })
            .collect()
    } else {
        doc.into_iter()
            .filter(|(field, _)| projection.get(field).is_none_or(included))
            .collect()
    }
}


pub(crate) fn matches(doc: &Document, filter: &Document) -> Result<bool, StoreError> {
    for (key, condition) in filter {
        let ok = match key.as_str() {
            "$and" => {
                let mut all = true;
                for clause in clauses(key, condition)? {
                    if !matches(doc, clause)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => {
                let mut any = false;
                for clause in clauses(key, condition)? {
                    if matches(doc, clause)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            "$nor" => {
                let mut none = true;
                for clause in clauses(key, condition)? {
                    if matches(doc, clause)? {
                        none = false;
                        break;
                    }
                }
                none
            }
            op if op.starts_with('$') => {
                return Err(StoreError::Query(format!("unsupported query operator {}", op)));
            }
            field => matches_field(doc.get(field), condition)?,
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn clauses<'a>(op: &str, condition: &'a Value) -> Result<Vec<&'a Document>, StoreError> {
    let Value::Array(items) = condition else {
        return Err(StoreError::Query(format!("{} expects an array", op)));
    };
    items
        .iter()
        .map(|item| {
            item.as_object()
                .ok_or_else(|| StoreError::Query(format!("{} clauses must be objects", op)))
        })
        .collect()
}

fn is_operator_object(condition: &Value) -> bool {
    match condition {
        Value::Object(map) => !map.is_empty() && map.keys().all(|k| k.starts_with('$')),
        _ => false,
    }
}

fn matches_field(value: Option<&Value>, condition: &Value) -> Result<bool, StoreError> {
    if !is_operator_object(condition) {
        return Ok(equals(value, condition));
    }
    let Value::Object(ops) = condition else {
        return Ok(false);
    };
    for (op, arg) in ops {
        let ok = match op.as_str() {
            "$eq" => equals(value, arg),
            "$ne" => !equals(value, arg),
            "$in" => in_list(value, op, arg)?,
            "$nin" => !in_list(value, op, arg)?,
            "$exists" => value.is_some() == truthy(arg),
            "$gt" => compare_opt(value, arg) == Some(Ordering::Greater),
            "$gte" => matches!(
                compare_opt(value, arg),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            "$lt" => compare_opt(value, arg) == Some(Ordering::Less),
            "$lte" => matches!(compare_opt(value, arg), Some(Ordering::Less | Ordering::Equal)),
            "$not" => !matches_field(value, arg)?,
            other => {
                return Err(StoreError::Query(format!("unsupported field operator {}", other)));
            }
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

// Absent fields compare equal to null.
fn equals(value: Option<&Value>, expected: &Value) -> bool {
    match value {
        None => expected.is_null(),
        Some(Value::Array(items)) if !expected.is_array() => items.contains(expected),
        Some(v) => v == expected,
    }
}

fn in_list(value: Option<&Value>, op: &str, arg: &Value) -> Result<bool, StoreError> {
    let Value::Array(candidates) = arg else {
        return Err(StoreError::Query(format!("{} expects an array", op)));
    };
    Ok(candidates.iter().any(|c| equals(value, c)))
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    }
}

fn compare_opt(value: Option<&Value>, bound: &Value) -> Option<Ordering> {
    compare(value?, bound)
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn sort_documents(docs: &mut [Document], keys: &[(String, SortOrder)]) {
    docs.sort_by(|a, b| {
        for (field, order) in keys {
            let ord = match (a.get(field), b.get(field)) {
                (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
                (None | Some(Value::Null), _) => Ordering::Less,
                (_, None | Some(Value::Null)) => Ordering::Greater,
                (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
            };
            let ord = match order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

fn apply_update(doc: &mut Document, update: &Update) -> bool {
    let mut modified = false;
    for (field, value) in update.set_fields() {
        if field == "_id" {
            continue;
        }
        if doc.get(field) != Some(value) {
            doc.insert(field.clone(), value.clone());
            modified = true;
        }
    }
    for field in update.unset_fields() {
        if doc.remove(field).is_some() {
            modified = true;
        }
    }
    modified
}
