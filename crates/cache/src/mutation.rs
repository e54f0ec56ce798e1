//! Description of an optimistic write.

use std::fmt;

use serde_json::Value;

use crate::key::QueryKey;

/// Identifies the mutation that owns an optimistic cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MutationId(pub(crate) u64);

impl fmt::Display for MutationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

pub(crate) type Patch = Box<dyn Fn(&mut Value) + Send + Sync>;

pub(crate) enum Target {
    Exact(QueryKey),
    Prefix(QueryKey),
}

impl Target {
    pub(crate) fn matches(&self, key: &QueryKey) -> bool {
        match self {
            Target::Exact(target) => target == key,
            Target::Prefix(prefix) => key.starts_with(prefix),
        }
    }
}

/// The optimistic side of a write: which cached views change, how, and
/// which views go stale once the backend confirms.
///
/// Patches only touch entries that are already cached; `insert` adds new
/// entries. Both are undone if the request fails.
pub struct Mutation {
    pub(crate) label: String,
    pub(crate) patches: Vec<(Target, Patch)>,
    pub(crate) inserts: Vec<(QueryKey, Value)>,
    pub(crate) removals: Vec<QueryKey>,
    pub(crate) invalidates: Vec<QueryKey>,
}

impl Mutation {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            patches: Vec::new(),
            inserts: Vec::new(),
            removals: Vec::new(),
            invalidates: Vec::new(),
        }
    }

    /// Patch the entry stored under exactly `key`.
    pub fn patch(mut self, key: QueryKey, f: impl Fn(&mut Value) + Send + Sync + 'static) -> Self {
        self.patches.push((Target::Exact(key), Box::new(f)));
        self
    }

    /// Patch every entry under `prefix`, e.g. all appointment lists.
    pub fn patch_all(
        mut self,
        prefix: QueryKey,
        f: impl Fn(&mut Value) + Send + Sync + 'static,
    ) -> Self {
        self.patches.push((Target::Prefix(prefix), Box::new(f)));
        self
    }

    /// Store `value` under `key`, replacing any cached entry.
    pub fn insert(mut self, key: QueryKey, value: Value) -> Self {
        self.inserts.push((key, value));
        self
    }

    /// Drop every entry under `prefix`, e.g. the detail of a deleted record.
    pub fn remove(mut self, prefix: QueryKey) -> Self {
        self.removals.push(prefix);
        self
    }

    /// Mark every entry under `prefix` stale after success.
    pub fn invalidate(mut self, prefix: QueryKey) -> Self {
        self.invalidates.push(prefix);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutation")
            .field("label", &self.label)
            .field("patches", &self.patches.len())
            .field("inserts", &self.inserts.len())
            .field("removals", &self.removals)
            .field("invalidates", &self.invalidates)
            .finish()
    }
}

/// Patch helpers for list envelopes (`{"data": [...], ...}`) and records.
pub mod patches {
    use serde_json::Value;

    /// Apply `f` to the record with `id`, whether `value` is a single
    /// record or a list envelope.
    pub fn update_record(value: &mut Value, id: &str, f: impl Fn(&mut Value)) {
        if value.get("id").and_then(Value::as_str) == Some(id) {
            f(value);
            return;
        }
        if let Some(items) = value.get_mut("data").and_then(Value::as_array_mut) {
            for item in items
                .iter_mut()
                .filter(|item| item.get("id").and_then(Value::as_str) == Some(id))
            {
                f(item);
            }
        }
    }

    /// Overwrite top-level fields of the record with `id`.
    pub fn merge_fields(value: &mut Value, id: &str, fields: &Value) {
        update_record(value, id, |record| {
            if let (Some(target), Some(source)) = (record.as_object_mut(), fields.as_object()) {
                for (k, v) in source {
                    target.insert(k.clone(), v.clone());
                }
            }
        });
    }

    /// Append `record` to a list envelope and bump its total.
    pub fn push_record(value: &mut Value, record: &Value) {
        if let Some(items) = value.get_mut("data").and_then(Value::as_array_mut) {
            items.push(record.clone());
            bump_total(value, 1);
        }
    }

    /// Remove the record with `id` from a list envelope.
    pub fn remove_record(value: &mut Value, id: &str) {
        let removed = match value.get_mut("data").and_then(Value::as_array_mut) {
            Some(items) => {
                let before = items.len();
                items.retain(|item| item.get("id").and_then(Value::as_str) != Some(id));
                before - items.len()
            }
            None => 0,
        };
        if removed > 0 {
            bump_total(value, -(removed as i64));
        }
    }

    fn bump_total(value: &mut Value, delta: i64) {
        if let Some(total) = value.get("total").and_then(Value::as_i64) {
            value["total"] = Value::from((total + delta).max(0));
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use serde_json::json;

        #[test]
        fn merges_into_list_and_detail() {
            let mut list = json!({"data": [{"id": "a", "status": "CREATED"}, {"id": "b", "status": "CREATED"}], "total": 2});
            merge_fields(&mut list, "b", &json!({"status": "CONFIRMED"}));
            assert_eq!(list["data"][0]["status"], "CREATED");
            assert_eq!(list["data"][1]["status"], "CONFIRMED");

            let mut detail = json!({"id": "a", "status": "CREATED"});
            merge_fields(&mut detail, "a", &json!({"status": "CONFIRMED"}));
            assert_eq!(detail["status"], "CONFIRMED");
        }

        #[test]
        fn push_and_remove_keep_total_in_sync() {
            let mut list = json!({"data": [], "total": 0});
            push_record(&mut list, &json!({"id": "x"}));
            assert_eq!(list["total"], 1);
            remove_record(&mut list, "x");
            assert_eq!(list["total"], 0);
            assert_eq!(list["data"], json!([]));
        }
    }
}
