//! Persistence codec: whole editing session ↔ one JSON document.
//!
//! Output always uses the current field set. Input is read leniently:
//! every annotation goes through the geometry normalizer, unknown or
//! malformed fields fall back to defaults, and snake_case/camelCase field
//! spellings from older writers are both accepted.

use crate::commands::UndoStack;
use crate::config::EditorConfig;
use crate::error::CodecError;
use crate::store::AnnotationStore;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use vp_core::compose::{ComposeOptions, GlobalIntent, PromptComposer};
use vp_core::geometry::{normalize_geometry, number, shape_of};
use vp_core::id::AnnotationId;
use vp_core::model::{Annotation, FillMode, PaletteColor, PromptList, clamp_opacity};
use vp_core::scale::ScaleInfo;
use vp_core::templates::TemplateCatalog;

/// The persisted session document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionDocument {
    pub positive_prompt: String,
    /// Reserved; always empty.
    pub negative_prompt: String,
    pub selected_annotations: Vec<AnnotationId>,
    pub global_operation_type: String,
    pub global_description: String,
    pub constraint_prompts: PromptList,
    pub decorative_prompts: PromptList,
    pub include_annotation_numbers: bool,
    pub annotations: Vec<Annotation>,
    pub image_scale_info: ScaleInfo,
    pub timestamp: String,
}

impl SessionDocument {
    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_value(&self) -> Result<Value, CodecError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Everything recovered from a document.
#[derive(Debug, Clone)]
pub struct RestoredSession {
    pub store: AnnotationStore,
    /// Rebuilt in load order so reloaded annotations can be undone.
    pub undo: UndoStack,
    pub intent: GlobalIntent,
    pub options: ComposeOptions,
    /// Last known scale; not authoritative once the image reloads.
    pub scale: Option<ScaleInfo>,
    pub positive_prompt: Option<String>,
}

// ─── Serialize ───────────────────────────────────────────────────────────

/// Snapshot a session. `positive_prompt` is the composed prompt, computed
/// without validation (it may be empty).
pub fn serialize(
    store: &AnnotationStore,
    intent: &GlobalIntent,
    options: ComposeOptions,
    scale: &ScaleInfo,
    catalog: &TemplateCatalog,
) -> SessionDocument {
    let selected = store.selected();
    let positive_prompt = PromptComposer::new(catalog).compose(&selected, intent, options);

    SessionDocument {
        positive_prompt,
        negative_prompt: String::new(),
        selected_annotations: selected.iter().map(|a| a.id).collect(),
        global_operation_type: intent.operation_type.clone().unwrap_or_default(),
        global_description: intent.description.clone(),
        constraint_prompts: intent.constraint_prompts.clone(),
        decorative_prompts: intent.decorative_prompts.clone(),
        include_annotation_numbers: options.include_numbers,
        annotations: store.annotations().to_vec(),
        image_scale_info: *scale,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

// ─── Deserialize ─────────────────────────────────────────────────────────

/// Parse a document string. Fails only when the text is not a JSON object.
pub fn deserialize_str(json: &str, config: EditorConfig) -> Result<RestoredSession, CodecError> {
    let value: Value = serde_json::from_str(json)?;
    if !value.is_object() {
        return Err(CodecError::NotAnObject);
    }
    Ok(deserialize(&value, config))
}

/// Rebuild a session from a parsed document. Never fails; anything
/// unreadable becomes a default.
pub fn deserialize(document: &Value, config: EditorConfig) -> RestoredSession {
    let empty = Map::new();
    let doc = document.as_object().unwrap_or(&empty);

    let listed: HashSet<AnnotationId> = field(doc, &["selected_annotations", "selectedAnnotations"])
        .and_then(Value::as_array)
        .map(|ids| {
            ids.iter()
                .filter_map(Value::as_str)
                .map(AnnotationId::intern)
                .collect()
        })
        .unwrap_or_default();

    let records = field(doc, &["annotations"])
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let annotations = restore_annotations(records, &listed, &config);
    let store = AnnotationStore::from_annotations(config, annotations);
    let undo = UndoStack::from_store(&store);

    let intent = GlobalIntent {
        operation_type: string_field(doc, &["global_operation_type", "globalOperationType"]),
        description: string_field(doc, &["global_description", "globalDescription"])
            .unwrap_or_default(),
        constraint_prompts: prompt_list(doc, &["constraint_prompts", "constraintPrompts"]),
        decorative_prompts: prompt_list(doc, &["decorative_prompts", "decorativePrompts"]),
    };
    let options = ComposeOptions {
        include_numbers: field(doc, &["include_annotation_numbers", "includeAnnotationNumbers"])
            .and_then(Value::as_bool)
            .unwrap_or(false),
    };
    let scale = field(doc, &["image_scale_info", "imageScaleInfo"]).and_then(|v| {
        serde_json::from_value::<ScaleInfo>(v.clone())
            .map_err(|e| log::warn!("ignoring unreadable image_scale_info: {e}"))
            .ok()
    });

    RestoredSession {
        store,
        undo,
        intent,
        options,
        scale,
        positive_prompt: string_field(doc, &["positive_prompt", "positivePrompt"]),
    }
}

/// Convert records to annotations, repairing IDs and numbers so the store
/// invariants hold.
fn restore_annotations(
    records: &[Value],
    listed: &HashSet<AnnotationId>,
    config: &EditorConfig,
) -> Vec<Annotation> {
    let mut seen: HashSet<AnnotationId> = HashSet::new();
    let mut out = Vec::with_capacity(records.len());
    let mut last_number = 0u32;
    let max_number = records
        .iter()
        .filter_map(|r| r.get("number").and_then(number))
        .fold(0.0f64, f64::max);
    let mut spare_number = (max_number.clamp(0.0, u32::MAX as f64 - 1.0) as u32) + 1;

    for record in records {
        if !record.is_object() {
            log::warn!("skipping non-object annotation record");
            continue;
        }
        let mut annotation = annotation_from_record(record, config);

        if !seen.insert(annotation.id) {
            let fresh = loop {
                let id = AnnotationId::generate();
                if !seen.contains(&id) && !listed.contains(&id) {
                    break id;
                }
            };
            log::warn!("duplicate annotation id {}, reassigned {fresh}", annotation.id);
            annotation.id = fresh;
            seen.insert(fresh);
        }

        if annotation.number <= last_number {
            log::warn!(
                "annotation {} has out-of-order number {}, reassigned {spare_number}",
                annotation.id,
                annotation.number
            );
            annotation.number = spare_number;
            spare_number = spare_number.saturating_add(1);
        }
        last_number = annotation.number;

        annotation.selected = annotation.selected || listed.contains(&annotation.id);
        out.push(annotation);
    }

    if !out.windows(2).all(|w| w[0].number < w[1].number) {
        log::warn!("annotation numbers exhausted, renumbering from 1");
        for (n, annotation) in (1u32..).zip(out.iter_mut()) {
            annotation.number = n;
        }
    }
    out
}

/// Build one annotation from any historical record encoding.
pub fn annotation_from_record(record: &Value, config: &EditorConfig) -> Annotation {
    let empty = Map::new();
    let map = record.as_object().unwrap_or(&empty);

    let shape = shape_of(record);
    let geometry = normalize_geometry(shape, record).geometry;

    let id = string_field(map, &["id"])
        .map(|s| AnnotationId::intern(&s))
        .unwrap_or_else(|| {
            log::warn!("annotation without id, generating one");
            AnnotationId::generate()
        });
    let ordinal = field(map, &["number"])
        .and_then(number)
        .filter(|n| *n >= 1.0 && *n <= u32::MAX as f64)
        .map_or(0, |n| n as u32);

    let color = match string_field(map, &["color"]) {
        Some(c) => PaletteColor::parse(&c).unwrap_or_else(|| {
            log::warn!("unknown annotation color {c:?}, using {}", config.default_color.name());
            config.default_color
        }),
        None => config.default_color,
    };
    let fill_mode = string_field(map, &["fillMode", "fill_mode"])
        .and_then(|s| FillMode::parse(&s))
        .unwrap_or(config.default_fill_mode);
    let opacity = field(map, &["opacity"])
        .and_then(number)
        .map_or(config.default_opacity, clamp_opacity);

    let mut annotation = Annotation::new(id, ordinal, shape, geometry, color);
    annotation.fill_mode = fill_mode;
    annotation.opacity = opacity;
    annotation.operation_type =
        string_field(map, &["operationType", "operation_type", "operation"]);
    annotation.description = string_field(map, &["description"]);
    annotation.constraint_prompts = prompt_list(map, &["constraintPrompts", "constraint_prompts"]);
    annotation.decorative_prompts = prompt_list(map, &["decorativePrompts", "decorative_prompts"]);
    annotation.selected = field(map, &["selected"])
        .and_then(Value::as_bool)
        .unwrap_or(false);
    annotation
}

// ─── Field readers ───────────────────────────────────────────────────────

/// First present key among `keys`.
fn field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| map.get(*k)).filter(|v| !v.is_null())
}

/// A non-empty string.
fn string_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    field(map, keys)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// A list of non-empty strings; non-string entries are dropped.
fn prompt_list(map: &Map<String, Value>, keys: &[&str]) -> PromptList {
    field(map, keys)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
