//! Prompt composer: annotation state + editing intent → instruction text.
//!
//! The mode is decided once, up front:
//!
//! - **NoSelection**: nothing selected; the global template is applied to
//!   "the entire image".
//! - **Independent**: at least one selected annotation has its own
//!   operation or description; each annotation renders its own instruction.
//! - **Shared**: no per-annotation intent but a global operation and text
//!   exist; one instruction covers all selected annotations.
//!
//! Anything else falls back to Independent with global defaults. Global
//! constraint and decorative prompts are appended last in every mode.

use crate::model::{Annotation, Point, PromptList};
use crate::templates::{OBJECT_TOKEN, TemplateCatalog};

/// Object description used when no annotation is selected.
pub const ENTIRE_IMAGE: &str = "the entire image";

/// Canvas positions above/left of this are "upper"/"left".
const NEAR_EDGE: f64 = 300.0;
/// Canvas positions below/right of this are "lower"/"right".
const FAR_EDGE: f64 = 600.0;

/// The session-wide editing intent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalIntent {
    pub operation_type: Option<String>,
    pub description: String,
    pub constraint_prompts: PromptList,
    pub decorative_prompts: PromptList,
}

impl GlobalIntent {
    pub fn operation(&self) -> Option<&str> {
        self.operation_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn text(&self) -> Option<&str> {
        Some(self.description.trim()).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComposeOptions {
    /// Suffix object descriptions with `(annotation N)`.
    pub include_numbers: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeMode {
    NoSelection,
    Independent,
    Shared,
}

/// Decide the composition mode for a selection.
pub fn decide_mode(selected: &[&Annotation], intent: &GlobalIntent) -> ComposeMode {
    if selected.is_empty() {
        ComposeMode::NoSelection
    } else if selected
        .iter()
        .any(|a| a.own_operation().is_some() || a.own_description().is_some())
    {
        ComposeMode::Independent
    } else if intent.operation().is_some() && intent.text().is_some() {
        ComposeMode::Shared
    } else {
        ComposeMode::Independent
    }
}

/// Turns annotations into instruction text using a template catalog.
pub struct PromptComposer<'a> {
    catalog: &'a TemplateCatalog,
}

impl<'a> PromptComposer<'a> {
    pub fn new(catalog: &'a TemplateCatalog) -> Self {
        Self { catalog }
    }

    /// Compose the final prompt. `selected` is in display order.
    ///
    /// Never fails: with no selection and no global operation or text the
    /// result is empty. Callers validate before calling.
    pub fn compose(
        &self,
        selected: &[&Annotation],
        intent: &GlobalIntent,
        options: ComposeOptions,
    ) -> String {
        let mode = decide_mode(selected, intent);
        log::debug!("composing {} annotation(s) in {mode:?} mode", selected.len());

        let body = match mode {
            ComposeMode::NoSelection => self.compose_whole_image(intent),
            ComposeMode::Shared => self.compose_shared(selected, intent, options),
            ComposeMode::Independent => self.compose_independent(selected, intent, options),
        };
        if body.is_empty() {
            return body;
        }

        let body = append_prompts(body, &intent.constraint_prompts);
        append_prompts(body, &intent.decorative_prompts)
    }

    fn compose_whole_image(&self, intent: &GlobalIntent) -> String {
        let (Some(op), Some(text)) = (intent.operation(), intent.text()) else {
            log::warn!("no selection and no global operation/text; nothing to compose");
            return String::new();
        };
        let template = self.catalog.get_or_fallback(Some(op));
        substitute_object(&template.build_description(text), ENTIRE_IMAGE)
    }

    fn compose_shared(
        &self,
        selected: &[&Annotation],
        intent: &GlobalIntent,
        options: ComposeOptions,
    ) -> String {
        let objects: Vec<String> = selected
            .iter()
            .map(|a| object_description(a, options.include_numbers))
            .collect();
        let template = self.catalog.get_or_fallback(intent.operation());
        let description = template.build_description(intent.text().unwrap_or_default());
        substitute_object(&description, &join_items(&objects))
    }

    fn compose_independent(
        &self,
        selected: &[&Annotation],
        intent: &GlobalIntent,
        options: ComposeOptions,
    ) -> String {
        let items: Vec<String> = selected
            .iter()
            .map(|a| self.annotation_instruction(a, intent, options))
            .collect();
        join_items(&items)
    }

    /// One annotation's instruction, with its own prompts appended.
    pub fn annotation_instruction(
        &self,
        annotation: &Annotation,
        intent: &GlobalIntent,
        options: ComposeOptions,
    ) -> String {
        let op = annotation.own_operation().or(intent.operation());
        let text = annotation
            .own_description()
            .or(intent.text())
            .unwrap_or_default();
        let template = self.catalog.get_or_fallback(op);
        let object = object_description(annotation, options.include_numbers);
        let instruction = substitute_object(&template.build_description(text), &object);
        let instruction = append_prompts(instruction, &annotation.constraint_prompts);
        append_prompts(instruction, &annotation.decorative_prompts)
    }
}

/// `the {color} {shape} marked area[ (annotation N)][ in the {bucket} part of the image]`
pub fn object_description(annotation: &Annotation, include_number: bool) -> String {
    let mut out = format!(
        "the {} {} marked area",
        annotation.color.name(),
        annotation.shape_type.descriptor()
    );
    if include_number {
        out.push_str(&format!(" (annotation {})", annotation.number));
    }
    if let Some(clause) = position_clause(annotation.geometry.center()) {
        out.push_str(&clause);
    }
    out
}

/// Coarse position of a center point on the canvas.
pub fn position_bucket(center: Point) -> String {
    let vertical = if center.y < NEAR_EDGE {
        "upper"
    } else if center.y > FAR_EDGE {
        "lower"
    } else {
        ""
    };
    let horizontal = if center.x < NEAR_EDGE {
        "left"
    } else if center.x > FAR_EDGE {
        "right"
    } else {
        "center"
    };
    format!("{vertical} {horizontal}").trim().to_string()
}

/// ` in the {bucket} part of the image`, or `None` without a center.
pub fn position_clause(center: Option<Point>) -> Option<String> {
    let bucket = position_bucket(center?);
    (!bucket.is_empty()).then(|| format!(" in the {bucket} part of the image"))
}

/// `a` / `a, and b` / `a, b, and c`.
pub fn join_items(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first}, and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

fn substitute_object(description: &str, object: &str) -> String {
    description.replace(OBJECT_TOKEN, object)
}

/// Append a comma-joined list of prompts, skipping blanks.
fn append_prompts(mut base: String, prompts: &[String]) -> String {
    for prompt in prompts.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
        base.push_str(", ");
        base.push_str(prompt);
    }
    base
}
