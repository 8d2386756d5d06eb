//! Creation undo stack.
//!
//! Records annotation IDs in creation order. Undo removes the most recently
//! created annotation that is still in the store. This is not a general
//! command history: field edits, deletes, and selection changes are not
//! recorded.

use crate::store::AnnotationStore;
use vp_core::id::AnnotationId;
use vp_core::model::Annotation;

#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    created: Vec<AnnotationId>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a store's current contents, oldest first.
    pub fn from_store(store: &AnnotationStore) -> Self {
        Self {
            created: store.iter().map(|a| a.id).collect(),
        }
    }

    /// Record a newly created annotation.
    pub fn record(&mut self, id: AnnotationId) {
        self.created.push(id);
    }

    /// Remove the most recently created annotation still present in the
    /// store. IDs already deleted directly are skipped and discarded.
    pub fn undo(&mut self, store: &mut AnnotationStore) -> Option<Annotation> {
        while let Some(id) = self.created.pop() {
            if let Some(removed) = store.delete(id) {
                log::debug!("undo removed #{} ({id})", removed.number);
                return Some(removed);
            }
        }
        None
    }

    /// `true` when an undo would remove something.
    pub fn can_undo(&self, store: &AnnotationStore) -> bool {
        self.created.iter().any(|id| store.contains(*id))
    }

    /// Recorded entries, including stale ones not yet skipped.
    pub fn len(&self) -> usize {
        self.created.len()
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }

    pub fn clear(&mut self) {
        self.created.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vp_core::model::ShapeType;

    fn create(store: &mut AnnotationStore, stack: &mut UndoStack) -> AnnotationId {
        let id = store.create(ShapeType::Rectangle, &json!({}), None).id;
        stack.record(id);
        id
    }

    #[test]
    fn undo_removes_last_created() {
        let mut store = AnnotationStore::default();
        let mut stack = UndoStack::new();
        let a = create(&mut store, &mut stack);
        let b = create(&mut store, &mut stack);

        let removed = stack.undo(&mut store).unwrap();
        assert_eq!(removed.id, b);
        assert!(store.contains(a));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn undo_skips_directly_deleted() {
        let mut store = AnnotationStore::default();
        let mut stack = UndoStack::new();
        let a = create(&mut store, &mut stack);
        let b = create(&mut store, &mut stack);
        store.delete(b);

        assert!(stack.can_undo(&store));
        assert_eq!(stack.undo(&mut store).map(|x| x.id), Some(a));
        assert!(store.is_empty());
        assert!(!stack.can_undo(&store));
        assert!(stack.undo(&mut store).is_none());
    }

    #[test]
    fn undo_on_empty_is_noop() {
        let mut store = AnnotationStore::default();
        let mut stack = UndoStack::new();
        assert!(stack.undo(&mut store).is_none());
        assert!(stack.is_empty());
    }

    #[test]
    fn undo_deselects_removed() {
        let mut store = AnnotationStore::default();
        let mut stack = UndoStack::new();
        let a = create(&mut store, &mut stack);
        store.select_all();
        stack.undo(&mut store);
        assert!(!store.selection().contains(a));
        assert!(store.selection_is_consistent());
    }
}
