//! Scripted in-memory remote used by engine and facade tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::models::{EntityKind, Record, RecordId};
use crate::remote::RemoteStore;

#[derive(Default)]
struct State {
    records: HashMap<EntityKind, Vec<Record>>,
    fail_all: bool,
    fail_ids: HashSet<String>,
    calls: Vec<String>,
}

/// Shared handle: clones observe and script the same remote.
#[derive(Clone, Default)]
pub struct ScriptedRemote {
    state: Arc<Mutex<State>>,
}

impl ScriptedRemote {
    pub fn fail_all(&self, fail: bool) {
        self.state.lock().unwrap().fail_all = fail;
    }

    pub fn fail_id(&self, id: &str) {
        self.state.lock().unwrap().fail_ids.insert(id.to_string());
    }

    pub fn seed(&self, kind: EntityKind, records: Vec<Record>) {
        self.state.lock().unwrap().records.insert(kind, records);
    }

    pub fn records(&self, kind: EntityKind) -> Vec<Record> {
        self.state
            .lock()
            .unwrap()
            .records
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    /// Write calls that reached the remote, e.g. `create:trip:<id>`
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn write(
        &self,
        op: &str,
        kind: EntityKind,
        id: &RecordId,
        apply: impl FnOnce(&mut Vec<Record>),
    ) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.fail_all || state.fail_ids.contains(id.as_str()) {
            return false;
        }
        state.calls.push(format!("{op}:{kind}:{id}"));
        apply(state.records.entry(kind).or_default());
        true
    }
}

impl RemoteStore for ScriptedRemote {
    async fn create(&self, kind: EntityKind, record: &Record) -> bool {
        self.write("create", kind, &record.id, |records| {
            records.push(record.clone());
        })
    }

    async fn update(&self, kind: EntityKind, record: &Record) -> bool {
        self.write("update", kind, &record.id, |records| {
            match records.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record.clone(),
                None => records.push(record.clone()),
            }
        })
    }

    async fn list(&self, kind: EntityKind) -> Option<Vec<Record>> {
        if self.state.lock().unwrap().fail_all {
            return None;
        }
        Some(self.records(kind))
    }

    async fn delete(&self, kind: EntityKind, id: &RecordId) -> bool {
        self.write("delete", kind, id, |records| {
            records.retain(|r| &r.id != id);
        })
    }

    async fn ping(&self) -> bool {
        !self.state.lock().unwrap().fail_all
    }
}
