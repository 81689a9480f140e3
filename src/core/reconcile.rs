//! Reconciliation of local records against a snapshot
//!
//! Records whose answer is unknown become additions; records whose answer
//! already exists become question updates on the existing entry. The answer
//! text of an existing entry is never rewritten.

use tracing::debug;

use super::record::AnswerRecord;
use super::snapshot::Snapshot;

/// Question changes for an existing entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryUpdate {
    pub id: i32,
    pub answer: String,
    pub add_questions: Vec<String>,
    pub remove_questions: Vec<String>,
}

impl EntryUpdate {
    /// Question list after the service applies this update to `existing`
    pub fn resulting_questions(&self, existing: &[String]) -> Vec<String> {
        existing
            .iter()
            .filter(|q| !self.remove_questions.contains(q))
            .chain(self.add_questions.iter())
            .cloned()
            .collect()
    }
}

/// Additions, updates and deletions sent as one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationBatch {
    pub additions: Vec<AnswerRecord>,
    pub updates: Vec<EntryUpdate>,
    pub deletions: Vec<i32>,
}

impl MutationBatch {
    /// Batch that only deletes entries
    pub fn deletions(ids: Vec<i32>) -> Self {
        Self {
            deletions: ids,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.updates.is_empty() && self.deletions.is_empty()
    }
}

/// Split records into additions and updates
///
/// With `overwrite_questions` the existing questions are replaced by the
/// record's; otherwise the record's questions are appended.
pub fn reconcile(records: &[AnswerRecord], snapshot: &Snapshot, overwrite_questions: bool) -> MutationBatch {
    let mut batch = MutationBatch::default();

    for record in records {
        match snapshot.get(&record.answer) {
            Some(existing) => {
                let remove_questions = if overwrite_questions {
                    existing.questions.clone()
                } else {
                    Vec::new()
                };
                batch.updates.push(EntryUpdate {
                    id: existing.id,
                    answer: existing.answer.clone(),
                    add_questions: record.questions.clone(),
                    remove_questions,
                });
            }
            None => batch.additions.push(record.clone()),
        }
    }

    debug!(
        additions = batch.additions.len(),
        updates = batch.updates.len(),
        overwrite_questions,
        "reconciled records"
    );
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RemoteEntry;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn snapshot() -> Snapshot {
        Snapshot::from_entries(vec![RemoteEntry {
            id: 10,
            answer: "Existing".to_string(),
            questions: strings(&["old 1", "old 2"]),
            source: None,
            metadata: Vec::new(),
        }])
    }

    #[test]
    fn test_unknown_answer_is_addition() {
        let record = AnswerRecord::new("Brand new", strings(&["q"]));
        for overwrite in [false, true] {
            let batch = reconcile(std::slice::from_ref(&record), &snapshot(), overwrite);
            assert_eq!(batch.additions, vec![record.clone()]);
            assert!(batch.updates.is_empty());
            assert!(batch.deletions.is_empty());
        }
    }

    #[test]
    fn test_merge_appends_questions() {
        let records = vec![AnswerRecord::new("Existing", strings(&["new", "old 1"]))];
        let batch = reconcile(&records, &snapshot(), false);

        assert!(batch.additions.is_empty());
        let update = &batch.updates[0];
        assert_eq!(update.id, 10);
        assert_eq!(update.answer, "Existing");
        assert!(update.remove_questions.is_empty());
        // Duplicates are left for the service to handle
        assert_eq!(
            update.resulting_questions(&strings(&["old 1", "old 2"])),
            strings(&["old 1", "old 2", "new", "old 1"])
        );
    }

    #[test]
    fn test_overwrite_replaces_questions() {
        let records = vec![AnswerRecord::new("Existing", strings(&["only this"]))];
        let batch = reconcile(&records, &snapshot(), true);

        let update = &batch.updates[0];
        assert_eq!(update.remove_questions, strings(&["old 1", "old 2"]));
        assert_eq!(
            update.resulting_questions(&strings(&["old 1", "old 2"])),
            strings(&["only this"])
        );
    }

    #[test]
    fn test_mixed_preserves_order() {
        let records = vec![
            AnswerRecord::new("A", strings(&["a"])),
            AnswerRecord::new("Existing", strings(&["e"])),
            AnswerRecord::new("B", strings(&["b"])),
        ];
        let batch = reconcile(&records, &snapshot(), false);
        assert_eq!(batch.additions.len(), 2);
        assert_eq!(batch.additions[0].answer, "A");
        assert_eq!(batch.additions[1].answer, "B");
        assert_eq!(batch.updates.len(), 1);
    }

    #[test]
    fn test_empty_records_give_empty_batch() {
        assert!(reconcile(&[], &snapshot(), false).is_empty());
        assert!(!MutationBatch::deletions(vec![1]).is_empty());
    }
}
