//! Annotation store and selection set.
//!
//! The store owns the ordered annotation list and the selection. Every
//! method that touches selection updates both the set and the per-annotation
//! `selected` flags before returning, so the two never disagree between
//! calls.

use crate::config::EditorConfig;
use serde_json::Value;
use std::collections::HashSet;
use vp_core::geometry::normalize_geometry;
use vp_core::id::AnnotationId;
use vp_core::model::{Annotation, AnnotationPatch, CanonicalGeometry, PaletteColor, ShapeType};

// ─── Selection ───────────────────────────────────────────────────────────

/// IDs currently chosen for batch operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: HashSet<AnnotationId>,
}

impl SelectionSet {
    pub fn contains(&self, id: AnnotationId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = AnnotationId> + '_ {
        self.ids.iter().copied()
    }
}

// ─── Store ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    selection: SelectionSet,
    next_number: u32,
    config: EditorConfig,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl AnnotationStore {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            annotations: Vec::new(),
            selection: SelectionSet::default(),
            next_number: 1,
            config,
        }
    }

    /// Rebuild a store from already-normalized annotations (persistence).
    /// Selection is taken from the `selected` flags.
    pub fn from_annotations(config: EditorConfig, annotations: Vec<Annotation>) -> Self {
        let next_number = annotations
            .iter()
            .map(|a| a.number)
            .max()
            .map_or(1, |n| n.saturating_add(1));
        let ids = annotations
            .iter()
            .filter(|a| a.selected)
            .map(|a| a.id)
            .collect();
        Self {
            annotations,
            selection: SelectionSet { ids },
            next_number,
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: AnnotationId) -> bool {
        self.get(id).is_some()
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Selected annotations in store (creation) order.
    pub fn selected(&self) -> Vec<&Annotation> {
        self.annotations
            .iter()
            .filter(|a| self.selection.contains(a.id))
            .collect()
    }

    /// Number the next created annotation will receive.
    pub fn next_number(&self) -> u32 {
        self.next_number
    }

    /// `true` when every flag matches selection membership and the set holds
    /// no stale IDs.
    pub fn selection_is_consistent(&self) -> bool {
        self.annotations
            .iter()
            .all(|a| a.selected == self.selection.contains(a.id))
            && self.selection.iter().all(|id| self.contains(id))
    }

    fn index_of(&self, id: AnnotationId) -> Option<usize> {
        self.annotations.iter().position(|a| a.id == id)
    }

    // ─── CRUD ────────────────────────────────────────────────────────────

    /// Create an annotation from whatever geometry the drawing surface
    /// produced. Returns a copy of the stored record.
    pub fn create(
        &mut self,
        shape_type: ShapeType,
        raw_geometry: &Value,
        color: Option<PaletteColor>,
    ) -> Annotation {
        let normalized = normalize_geometry(shape_type, raw_geometry);
        let color = color.unwrap_or(self.config.default_color);
        self.push_new(shape_type, normalized.geometry, color)
    }

    fn push_new(
        &mut self,
        shape_type: ShapeType,
        geometry: CanonicalGeometry,
        color: PaletteColor,
    ) -> Annotation {
        let id = self.fresh_id();
        let number = self.next_number;
        self.next_number = self.next_number.saturating_add(1);

        let mut annotation = Annotation::new(id, number, shape_type, geometry, color);
        annotation.fill_mode = self.config.default_fill_mode;
        annotation.opacity = self.config.default_opacity;

        log::debug!("created {} #{number} ({id})", shape_type.as_str());
        self.annotations.push(annotation.clone());
        annotation
    }

    fn fresh_id(&self) -> AnnotationId {
        loop {
            let id = AnnotationId::generate();
            if !self.contains(id) {
                return id;
            }
        }
    }

    /// Apply a partial update. Returns `false` (and does nothing) for an
    /// unknown ID.
    pub fn update(&mut self, id: AnnotationId, patch: AnnotationPatch) -> bool {
        match self.annotations.iter_mut().find(|a| a.id == id) {
            Some(annotation) => {
                annotation.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Remove an annotation and drop it from the selection. Idempotent.
    pub fn delete(&mut self, id: AnnotationId) -> Option<Annotation> {
        let idx = self.index_of(id)?;
        self.selection.ids.remove(&id);
        let removed = self.annotations.remove(idx);
        log::debug!("deleted #{} ({id})", removed.number);
        Some(removed)
    }

    /// Remove every annotation and empty the selection.
    /// Numbering continues from where it was.
    pub fn clear(&mut self) {
        self.annotations.clear();
        self.selection.ids.clear();
    }

    /// Copy an annotation, shifted by the configured offset, with a fresh ID
    /// and number. Style and prompt fields are preserved; the copy starts
    /// unselected.
    pub fn duplicate(&mut self, id: AnnotationId) -> Option<Annotation> {
        let source = self.get(id)?.clone();
        let offset = self.config.duplicate_offset;

        let mut geometry = source.geometry.clone();
        geometry.translate(offset, offset);

        let fresh = self.push_new(source.shape_type, geometry, source.color);
        let copy = Annotation {
            id: fresh.id,
            number: fresh.number,
            geometry: fresh.geometry,
            selected: false,
            ..source
        };
        if let Some(slot) = self.annotations.last_mut() {
            *slot = copy.clone();
        }
        Some(copy)
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select exactly one annotation. Unknown IDs leave selection unchanged.
    pub fn select_only(&mut self, id: AnnotationId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.selection.ids.clear();
        self.selection.ids.insert(id);
        self.sync_flags();
        true
    }

    /// Flip one annotation's membership. Unknown IDs are ignored.
    pub fn toggle(&mut self, id: AnnotationId) -> bool {
        let Some(annotation) = self.annotations.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        annotation.selected = !annotation.selected;
        if annotation.selected {
            self.selection.ids.insert(id);
        } else {
            self.selection.ids.remove(&id);
        }
        true
    }

    pub fn select_all(&mut self) {
        self.selection.ids = self.annotations.iter().map(|a| a.id).collect();
        self.sync_flags();
    }

    pub fn clear_selection(&mut self) {
        self.selection.ids.clear();
        self.sync_flags();
    }

    fn sync_flags(&mut self) {
        for annotation in &mut self.annotations {
            annotation.selected = self.selection.ids.contains(&annotation.id);
        }
    }
}
