//! Knowledge base snapshot
//!
//! A full download of one slice, indexed by answer text. Built fresh for
//! every reconciliation so updates never target stale ids.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::error::Result;
use crate::remote::{QnaBackend, RemoteEntry, Slice};

/// Remote entries keyed by answer text
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    by_answer: HashMap<String, RemoteEntry>,
    /// Entries dropped because an earlier one had the same answer
    duplicates: Vec<RemoteEntry>,
}

impl Snapshot {
    /// Index entries by answer; the first entry for an answer wins
    pub fn from_entries(entries: Vec<RemoteEntry>) -> Self {
        let mut snapshot = Self::default();

        for entry in entries {
            if snapshot.by_answer.contains_key(&entry.answer) {
                warn!(id = entry.id, answer = %entry.answer, "duplicate answer in knowledge base, keeping first");
                snapshot.duplicates.push(entry);
            } else {
                snapshot.by_answer.insert(entry.answer.clone(), entry);
            }
        }

        snapshot
    }

    pub fn get(&self, answer: &str) -> Option<&RemoteEntry> {
        self.by_answer.get(answer)
    }

    pub fn len(&self) -> usize {
        self.by_answer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_answer.is_empty()
    }

    pub fn duplicates(&self) -> &[RemoteEntry] {
        &self.duplicates
    }

    /// Distinct answer texts that occur more than once
    pub fn duplicate_answers(&self) -> Vec<String> {
        let mut answers: Vec<String> = Vec::new();
        for entry in &self.duplicates {
            if !answers.contains(&entry.answer) {
                answers.push(entry.answer.clone());
            }
        }
        answers
    }
}

/// Download one slice and index it
pub async fn fetch<B: QnaBackend + ?Sized>(backend: &B, kb_id: &str, slice: Slice) -> Result<Snapshot> {
    let entries = backend.download_knowledge_base(kb_id, slice).await?;
    let snapshot = Snapshot::from_entries(entries);
    info!(kb_id, %slice, entries = snapshot.len(), "fetched knowledge base snapshot");
    Ok(snapshot)
}
