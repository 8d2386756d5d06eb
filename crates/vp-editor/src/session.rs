//! Editing session: the single object a UI drives.
//!
//! Holds the store, the creation undo stack, the global intent, and the
//! last resolved image scale. Every mutation leaves `annotations()` ready
//! for re-rendering and discards any previously accepted enhanced prompt.

use crate::codec::{self, SessionDocument};
use crate::commands::UndoStack;
use crate::config::EditorConfig;
use crate::enhance::{EnhanceRequest, EnhanceResponse, EnhanceSettings};
use crate::error::{CodecError, ValidationError};
use crate::slot::SessionSlot;
use crate::store::{AnnotationStore, SelectionSet};
use serde_json::Value;
use vp_core::compose::{ComposeOptions, GlobalIntent, PromptComposer, decide_mode};
use vp_core::id::AnnotationId;
use vp_core::model::{Annotation, AnnotationPatch, PaletteColor, Point, PromptList, ShapeType};
use vp_core::scale::{ScaleInfo, Size};
use vp_core::templates::TemplateCatalog;

#[derive(Debug, Clone)]
pub struct EditorSession {
    store: AnnotationStore,
    undo: UndoStack,
    catalog: TemplateCatalog,
    intent: GlobalIntent,
    options: ComposeOptions,
    scale: ScaleInfo,
    enhanced: Option<String>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            store: AnnotationStore::new(config),
            undo: UndoStack::new(),
            catalog: TemplateCatalog::builtin(),
            intent: GlobalIntent::default(),
            options: ComposeOptions::default(),
            scale: ScaleInfo::default(),
            enhanced: None,
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn annotations(&self) -> &[Annotation] {
        self.store.annotations()
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn selection(&self) -> &SelectionSet {
        self.store.selection()
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn intent(&self) -> &GlobalIntent {
        &self.intent
    }

    pub fn options(&self) -> ComposeOptions {
        self.options
    }

    pub fn scale(&self) -> &ScaleInfo {
        &self.scale
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo(&self.store)
    }

    pub fn enhanced_prompt(&self) -> Option<&str> {
        self.enhanced.as_deref()
    }

    // ─── Annotation edits ────────────────────────────────────────────────

    /// Create from raw drawing-surface geometry and record it for undo.
    pub fn create(
        &mut self,
        shape_type: ShapeType,
        raw_geometry: &Value,
        color: Option<PaletteColor>,
    ) -> Annotation {
        let created = self.store.create(shape_type, raw_geometry, color);
        self.undo.record(created.id);
        self.touch();
        created
    }

    pub fn update(&mut self, id: AnnotationId, patch: AnnotationPatch) -> bool {
        let changed = self.store.update(id, patch);
        if changed {
            self.touch();
        }
        changed
    }

    pub fn delete(&mut self, id: AnnotationId) -> Option<Annotation> {
        let removed = self.store.delete(id);
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    /// Remove everything; undo history goes with it.
    pub fn clear(&mut self) {
        self.store.clear();
        self.undo.clear();
        self.touch();
    }

    /// Duplicates are undoable like any other creation.
    pub fn duplicate(&mut self, id: AnnotationId) -> Option<Annotation> {
        let copy = self.store.duplicate(id)?;
        self.undo.record(copy.id);
        self.touch();
        Some(copy)
    }

    pub fn undo(&mut self) -> Option<Annotation> {
        let removed = self.undo.undo(&mut self.store);
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn select_only(&mut self, id: AnnotationId) -> bool {
        let hit = self.store.select_only(id);
        if hit {
            self.touch();
        }
        hit
    }

    pub fn toggle(&mut self, id: AnnotationId) -> bool {
        let hit = self.store.toggle(id);
        if hit {
            self.touch();
        }
        hit
    }

    pub fn select_all(&mut self) {
        self.store.select_all();
        self.touch();
    }

    pub fn clear_selection(&mut self) {
        self.store.clear_selection();
        self.touch();
    }

    // ─── Global intent ───────────────────────────────────────────────────

    pub fn set_global_operation(&mut self, operation: Option<&str>) {
        self.intent.operation_type = operation
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self.touch();
    }

    pub fn set_global_description(&mut self, text: &str) {
        self.intent.description = text.to_string();
        self.touch();
    }

    pub fn set_constraint_prompts(&mut self, prompts: PromptList) {
        self.intent.constraint_prompts = prompts;
        self.touch();
    }

    pub fn set_decorative_prompts(&mut self, prompts: PromptList) {
        self.intent.decorative_prompts = prompts;
        self.touch();
    }

    pub fn set_include_numbers(&mut self, include: bool) {
        self.options.include_numbers = include;
        self.touch();
    }

    /// Re-resolve the scale after the image (re)loads or the canvas resizes.
    pub fn set_image_size(&mut self, display: Option<Size>, natural: Option<Size>, offset: Point) {
        self.scale = ScaleInfo::resolve(display, natural, offset);
    }

    fn touch(&mut self) {
        if self.enhanced.take().is_some() {
            log::debug!("session changed, discarding enhanced prompt");
        }
    }

    // ─── Generation ──────────────────────────────────────────────────────

    /// Check that generation may run. A non-empty selection always passes;
    /// with nothing selected the global operation must exist, be runnable on
    /// the whole image, and have text to apply.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.store.selection().is_empty() {
            return Ok(());
        }
        let Some(operation) = self.intent.operation() else {
            return Err(ValidationError::MissingOperation);
        };
        match self.catalog.requires_selection(operation) {
            None => {
                return Err(ValidationError::UnknownOperation {
                    operation: operation.to_string(),
                });
            }
            Some(true) => {
                return Err(ValidationError::SelectionRequired {
                    operation: operation.to_string(),
                });
            }
            Some(false) => {}
        }
        if self.intent.text().is_none() {
            return Err(ValidationError::MissingDescription);
        }
        Ok(())
    }

    /// Validate, then compose. Never mutates the session.
    pub fn generate(&self) -> Result<String, ValidationError> {
        self.validate()?;
        let selected = self.store.selected();
        log::debug!(
            "composing {:?} prompt for {} annotation(s)",
            decide_mode(&selected, &self.intent),
            selected.len()
        );
        Ok(PromptComposer::new(&self.catalog).compose(&selected, &self.intent, self.options))
    }

    // ─── Enhancement ─────────────────────────────────────────────────────

    pub fn enhance_request(
        &self,
        settings: &EnhanceSettings,
    ) -> Result<EnhanceRequest, ValidationError> {
        let prompt = self.generate()?;
        let snapshot = self.store.selected().into_iter().cloned().collect();
        Ok(EnhanceRequest::new(prompt, settings, snapshot))
    }

    /// Adopt the service's rewrite as the persisted prompt until the next
    /// change. Blank replacements are ignored.
    pub fn accept_enhanced(&mut self, prompt: impl Into<String>) {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            log::warn!("ignoring empty enhanced prompt");
            return;
        }
        self.enhanced = Some(prompt);
    }

    pub fn accept_enhanced_response(&mut self, response: EnhanceResponse) {
        self.accept_enhanced(response.enhanced_prompt);
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    pub fn to_document(&self) -> SessionDocument {
        let mut doc = codec::serialize(
            &self.store,
            &self.intent,
            self.options,
            &self.scale,
            &self.catalog,
        );
        if let Some(enhanced) = &self.enhanced {
            doc.positive_prompt = enhanced.clone();
        }
        doc
    }

    pub fn to_json(&self) -> Result<String, CodecError> {
        self.to_document().to_json()
    }

    /// Restore a session. The persisted scale is kept only until the host
    /// calls `set_image_size`. A persisted prompt that differs from what the
    /// restored state composes to is an accepted enhancement and is kept.
    pub fn from_json(json: &str, config: EditorConfig) -> Result<Self, CodecError> {
        let restored = codec::deserialize_str(json, config)?;
        let mut session = Self {
            store: restored.store,
            undo: restored.undo,
            catalog: TemplateCatalog::builtin(),
            intent: restored.intent,
            options: restored.options,
            scale: restored.scale.unwrap_or_default(),
            enhanced: None,
        };
        if let Some(persisted) = restored.positive_prompt {
            let composed = PromptComposer::new(&session.catalog).compose(
                &session.store.selected(),
                &session.intent,
                session.options,
            );
            if persisted != composed {
                log::debug!("restoring enhanced prompt");
                session.enhanced = Some(persisted);
            }
        }
        Ok(session)
    }

    pub fn save(&self, slot: &mut dyn SessionSlot) -> Result<(), CodecError> {
        let json = self.to_json()?;
        slot.save(&json)?;
        Ok(())
    }

    /// `Ok(None)` when the slot is empty.
    pub fn load(slot: &dyn SessionSlot, config: EditorConfig) -> Result<Option<Self>, CodecError> {
        match slot.load()? {
            Some(json) => Self::from_json(&json, config).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::MemorySlot;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn validate_reports_missing_operation() {
        let session = EditorSession::default();
        assert_eq!(session.generate(), Err(ValidationError::MissingOperation));
    }

    #[test]
    fn validate_requires_selection_for_local_ops() {
        let mut session = EditorSession::default();
        session.set_global_operation(Some("change_color"));
        session.set_global_description("red");
        assert_eq!(
            session.generate(),
            Err(ValidationError::SelectionRequired {
                operation: "change_color".into()
            })
        );
    }

    #[test]
    fn validate_rejects_unknown_op_without_selection() {
        let mut session = EditorSession::default();
        session.set_global_operation(Some("teleport"));
        assert_eq!(
            session.validate(),
            Err(ValidationError::UnknownOperation {
                operation: "teleport".into()
            })
        );
    }

    #[test]
    fn validate_requires_text_for_global_ops() {
        let mut session = EditorSession::default();
        session.set_global_operation(Some("global_color_grade"));
        session.set_global_description("   ");
        assert_eq!(session.validate(), Err(ValidationError::MissingDescription));
    }

    #[test]
    fn selection_always_validates() {
        let mut session = EditorSession::default();
        let a = session.create(ShapeType::Rectangle, &json!({}), None);
        session.select_only(a.id);
        assert_eq!(session.validate(), Ok(()));
        assert!(session.generate().is_ok());
    }

    #[test]
    fn duplicate_is_undoable() {
        let mut session = EditorSession::default();
        let a = session.create(ShapeType::Circle, &json!({ "coordinates": [0, 0, 10, 10] }), None);
        let copy = session.duplicate(a.id).unwrap();
        assert_eq!(session.undo().map(|x| x.id), Some(copy.id));
        assert_eq!(session.undo().map(|x| x.id), Some(a.id));
        assert!(!session.can_undo());
    }

    #[test]
    fn clear_drops_undo_history() {
        let mut session = EditorSession::default();
        session.create(ShapeType::Rectangle, &json!({}), None);
        session.clear();
        assert!(!session.can_undo());
        assert!(session.undo().is_none());
    }

    #[test]
    fn enhanced_prompt_persists_until_next_change() {
        let mut session = EditorSession::default();
        session.set_global_operation(Some("global_enhance"));
        session.set_global_description("crisp");
        session.accept_enhanced("A crisper, cleaner photo");
        assert_eq!(session.to_document().positive_prompt, "A crisper, cleaner photo");

        session.set_include_numbers(true);
        assert_eq!(session.enhanced_prompt(), None);
        assert_eq!(session.to_document().positive_prompt, session.generate().unwrap());
    }

    #[test]
    fn enhanced_prompt_survives_reload() {
        let mut session = EditorSession::default();
        session.set_global_operation(Some("global_enhance"));
        session.set_global_description("crisp");
        session.accept_enhanced_response(EnhanceResponse {
            enhanced_prompt: "A crisper photo".into(),
        });

        let mut slot = MemorySlot::new();
        session.save(&mut slot).unwrap();
        let mut reloaded = EditorSession::load(&slot, EditorConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.enhanced_prompt(), Some("A crisper photo"));
        assert_eq!(reloaded.to_document().positive_prompt, "A crisper photo");

        reloaded.set_global_description("sharper");
        assert_eq!(reloaded.enhanced_prompt(), None);
    }

    #[test]
    fn composed_prompt_is_not_restored_as_enhanced() {
        let mut session = EditorSession::default();
        session.set_global_operation(Some("global_enhance"));
        session.set_global_description("crisp");
        let json = session.to_json().unwrap();
        let reloaded = EditorSession::from_json(&json, EditorConfig::default()).unwrap();
        assert_eq!(reloaded.enhanced_prompt(), None);
    }

    #[test]
    fn enhance_request_snapshots_selection() {
        let mut session = EditorSession::default();
        let a = session.create(ShapeType::Rectangle, &json!({}), None);
        session.create(ShapeType::Rectangle, &json!({}), None);
        session.select_only(a.id);

        let req = session.enhance_request(&EnhanceSettings::default()).unwrap();
        assert_eq!(req.annotation_snapshot.len(), 1);
        assert_eq!(req.annotation_snapshot[0].id, a.id);
        assert_eq!(req.edit_description, session.generate().unwrap());
    }

    #[test]
    fn save_and_load_through_slot() {
        let mut session = EditorSession::default();
        let a = session.create(ShapeType::Arrow, &json!({ "start": {"x": 1, "y": 2}, "end": {"x": 3, "y": 4} }), Some(PaletteColor::Blue));
        session.toggle(a.id);
        session.set_global_operation(Some("change_color"));
        session.set_include_numbers(true);

        let mut slot = MemorySlot::new();
        session.save(&mut slot).unwrap();
        let loaded = EditorSession::load(&slot, EditorConfig::default())
            .unwrap()
            .unwrap();

        assert_eq!(loaded.annotations(), session.annotations());
        assert_eq!(loaded.intent(), session.intent());
        assert!(loaded.options().include_numbers);
        assert!(loaded.selection().contains(a.id));
        assert!(loaded.can_undo());
    }

    #[test]
    fn empty_slot_loads_nothing() {
        let slot = MemorySlot::new();
        assert!(EditorSession::load(&slot, EditorConfig::default()).unwrap().is_none());
    }
}
