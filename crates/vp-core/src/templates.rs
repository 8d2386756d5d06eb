//! Operation template catalog.
//!
//! Each operation type maps to a description template, the constraint
//! prompts and decorative prompts offered for it, and a category that
//! decides whether annotations must be selected before generating.
//!
//! Templates carry two placeholders: `{text}` is filled by the description
//! builder with the user's free text, `{object}` is left for the composer.

/// Placeholder the composer replaces with the generated object description.
pub const OBJECT_TOKEN: &str = "{object}";
const TEXT_TOKEN: &str = "{text}";

/// Grouping that decides the selection requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationCategory {
    Global,
    Local,
    Text,
    Professional,
}

impl OperationCategory {
    /// `local` and `text` edits need at least one selected annotation.
    pub fn requires_selection(self) -> bool {
        matches!(self, OperationCategory::Local | OperationCategory::Text)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperationCategory::Global => "global",
            OperationCategory::Local => "local",
            OperationCategory::Text => "text",
            OperationCategory::Professional => "professional",
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct OperationTemplate {
    pub key: &'static str,
    pub category: OperationCategory,
    /// Template used when free text is given; contains `{text}`.
    with_text: &'static str,
    /// Template used when the free text is blank.
    bare: &'static str,
    pub constraints: &'static [&'static str],
    pub decoratives: &'static [&'static str],
}

impl OperationTemplate {
    /// Build the description for this operation. The result still contains
    /// the `{object}` placeholder.
    pub fn build_description(&self, free_text: &str) -> String {
        let text = free_text.trim();
        if text.is_empty() {
            self.bare.to_string()
        } else {
            self.with_text.replace(TEXT_TOKEN, text)
        }
    }
}

/// Used for operation keys the catalog does not know.
pub const FALLBACK_TEMPLATE: OperationTemplate = OperationTemplate {
    key: "custom",
    category: OperationCategory::Professional,
    with_text: "Apply the following edit to {object}: {text}",
    bare: "Edit {object}",
    constraints: GENERAL_CONSTRAINTS,
    decoratives: GENERAL_DECORATIVES,
};

// ─── Prompt option lists ─────────────────────────────────────────────────

const GENERAL_CONSTRAINTS: &[&str] = &[
    "keep everything outside the marked area unchanged",
    "maintain the original image resolution",
    "preserve natural lighting and shadows",
    "no visible seams or artifacts",
];

const GENERAL_DECORATIVES: &[&str] = &[
    "high quality",
    "highly detailed",
    "professional finish",
    "visually harmonious",
];

const COLOR_CONSTRAINTS: &[&str] = &[
    "preserve the original texture and material",
    "keep shading and highlights consistent",
    "do not change the shape of the object",
    "avoid color bleeding into surrounding areas",
];

const COLOR_DECORATIVES: &[&str] = &[
    "vibrant colors",
    "rich color depth",
    "natural color transition",
    "harmonious color palette",
];

const OBJECT_CONSTRAINTS: &[&str] = &[
    "match the perspective of the scene",
    "match the lighting direction of the scene",
    "keep a realistic scale relative to the surroundings",
    "blend edges seamlessly with the background",
];

const OBJECT_DECORATIVES: &[&str] = &[
    "photorealistic",
    "natural integration",
    "sharp focus",
    "lifelike details",
];

const REMOVAL_CONSTRAINTS: &[&str] = &[
    "fill the area with plausible background content",
    "leave no ghosting or outline of the removed object",
    "continue surrounding patterns and textures",
];

const REMOVAL_DECORATIVES: &[&str] = &["clean result", "seamless fill", "natural background"];

const PERSON_CONSTRAINTS: &[&str] = &[
    "preserve the person's identity",
    "keep facial features recognizable",
    "keep anatomy natural and proportional",
];

const PERSON_DECORATIVES: &[&str] = &[
    "natural expression",
    "expressive",
    "flattering look",
    "fashionable",
];

const TEXT_CONSTRAINTS: &[&str] = &[
    "text must be legible",
    "match the existing font style",
    "keep the text aligned with the surface perspective",
    "spell the text exactly as given",
];

const TEXT_DECORATIVES: &[&str] = &[
    "clean typography",
    "crisp lettering",
    "elegant font",
    "bold and eye-catching",
];

const GLOBAL_CONSTRAINTS: &[&str] = &[
    "preserve the composition",
    "keep all subjects recognizable",
    "avoid over-saturation",
    "maintain natural skin tones",
];

const GLOBAL_DECORATIVES: &[&str] = &[
    "cinematic look",
    "film grain",
    "dramatic atmosphere",
    "soft dreamy mood",
    "magazine quality",
];

const PRO_CONSTRAINTS: &[&str] = &[
    "keep straight lines straight",
    "preserve geometric accuracy",
    "match the camera perspective",
    "maintain physically plausible lighting",
];

const PRO_DECORATIVES: &[&str] = &[
    "studio quality",
    "retouched finish",
    "commercial grade",
];

// ─── Catalog entries ─────────────────────────────────────────────────────

use OperationCategory::{Global, Local, Professional, Text};

const fn op(
    key: &'static str,
    category: OperationCategory,
    with_text: &'static str,
    bare: &'static str,
    constraints: &'static [&'static str],
    decoratives: &'static [&'static str],
) -> OperationTemplate {
    OperationTemplate {
        key,
        category,
        with_text,
        bare,
        constraints,
        decoratives,
    }
}

static BUILTIN: &[OperationTemplate] = &[
    // Global
    op(
        "global_color_grade",
        Global,
        "Apply {text} color grading to {object}",
        "Apply professional color grading to {object}",
        GLOBAL_CONSTRAINTS,
        GLOBAL_DECORATIVES,
    ),
    op(
        "global_style_transfer",
        Global,
        "Transform {object} into {text} style",
        "Apply an artistic style transfer to {object}",
        GLOBAL_CONSTRAINTS,
        GLOBAL_DECORATIVES,
    ),
    op(
        "global_brightness_contrast",
        Global,
        "Adjust the brightness and contrast of {object}: {text}",
        "Balance the brightness and contrast of {object}",
        GLOBAL_CONSTRAINTS,
        GLOBAL_DECORATIVES,
    ),
    op(
        "global_hue_saturation",
        Global,
        "Adjust the hue and saturation of {object}: {text}",
        "Balance the hue and saturation of {object}",
        GLOBAL_CONSTRAINTS,
        GLOBAL_DECORATIVES,
    ),
    op(
        "global_sharpen_blur",
        Global,
        "Apply {text} to {object}",
        "Sharpen {object}",
        GLOBAL_CONSTRAINTS,
        GLOBAL_DECORATIVES,
    ),
    op(
        "global_add_filter",
        Global,
        "Add a {text} filter to {object}",
        "Add a tasteful filter to {object}",
        GLOBAL_CONSTRAINTS,
        GLOBAL_DECORATIVES,
    ),
    op(
        "global_enhance",
        Global,
        "Enhance {object}: {text}",
        "Enhance the overall quality of {object}",
        GLOBAL_CONSTRAINTS,
        GLOBAL_DECORATIVES,
    ),
    // Local
    op(
        "change_color",
        Local,
        "Change the color of {object} to {text}",
        "Change the color of {object}",
        COLOR_CONSTRAINTS,
        COLOR_DECORATIVES,
    ),
    op(
        "change_style",
        Local,
        "Change the style of {object} to {text}",
        "Restyle {object}",
        OBJECT_CONSTRAINTS,
        OBJECT_DECORATIVES,
    ),
    op(
        "replace_object",
        Local,
        "Replace {object} with {text}",
        "Replace {object} with a suitable alternative",
        OBJECT_CONSTRAINTS,
        OBJECT_DECORATIVES,
    ),
    op(
        "add_object",
        Local,
        "Add {text} to {object}",
        "Add a fitting object to {object}",
        OBJECT_CONSTRAINTS,
        OBJECT_DECORATIVES,
    ),
    op(
        "remove_object",
        Local,
        "Remove {text} from {object} and fill the area naturally",
        "Remove {object} and fill the area naturally",
        REMOVAL_CONSTRAINTS,
        REMOVAL_DECORATIVES,
    ),
    op(
        "change_background",
        Local,
        "Change the background in {object} to {text}",
        "Change the background in {object}",
        OBJECT_CONSTRAINTS,
        OBJECT_DECORATIVES,
    ),
    op(
        "change_texture",
        Local,
        "Change the texture of {object} to {text}",
        "Change the texture of {object}",
        COLOR_CONSTRAINTS,
        OBJECT_DECORATIVES,
    ),
    op(
        "change_lighting",
        Local,
        "Change the lighting on {object} to {text}",
        "Improve the lighting on {object}",
        OBJECT_CONSTRAINTS,
        GLOBAL_DECORATIVES,
    ),
    op(
        "change_pose",
        Local,
        "Change the pose of the subject in {object} to {text}",
        "Change the pose of the subject in {object}",
        PERSON_CONSTRAINTS,
        PERSON_DECORATIVES,
    ),
    op(
        "change_expression",
        Local,
        "Change the facial expression in {object} to {text}",
        "Change the facial expression in {object}",
        PERSON_CONSTRAINTS,
        PERSON_DECORATIVES,
    ),
    op(
        "change_clothing",
        Local,
        "Change the clothing in {object} to {text}",
        "Change the clothing in {object}",
        PERSON_CONSTRAINTS,
        PERSON_DECORATIVES,
    ),
    op(
        "resize_object",
        Local,
        "Resize {object}: {text}",
        "Resize {object} proportionally",
        OBJECT_CONSTRAINTS,
        OBJECT_DECORATIVES,
    ),
    op(
        "enhance_quality",
        Local,
        "Enhance the quality of {object}: {text}",
        "Enhance the quality of {object}",
        GENERAL_CONSTRAINTS,
        GENERAL_DECORATIVES,
    ),
    op(
        "blur_area",
        Local,
        "Blur {object}: {text}",
        "Blur {object}",
        GENERAL_CONSTRAINTS,
        GENERAL_DECORATIVES,
    ),
    // Text
    op(
        "text_add",
        Text,
        "Add the text \"{text}\" in {object}",
        "Add text in {object}",
        TEXT_CONSTRAINTS,
        TEXT_DECORATIVES,
    ),
    op(
        "text_remove",
        Text,
        "Remove the text \"{text}\" from {object}",
        "Remove the text in {object}",
        REMOVAL_CONSTRAINTS,
        REMOVAL_DECORATIVES,
    ),
    op(
        "text_edit",
        Text,
        "Change the text in {object} to \"{text}\"",
        "Edit the text in {object}",
        TEXT_CONSTRAINTS,
        TEXT_DECORATIVES,
    ),
    op(
        "text_style",
        Text,
        "Change the text style in {object} to {text}",
        "Restyle the text in {object}",
        TEXT_CONSTRAINTS,
        TEXT_DECORATIVES,
    ),
    // Professional
    op(
        "geometric_warp",
        Professional,
        "Apply a geometric warp to {object}: {text}",
        "Apply a geometric warp to {object}",
        PRO_CONSTRAINTS,
        PRO_DECORATIVES,
    ),
    op(
        "perspective_correction",
        Professional,
        "Correct the perspective of {object}: {text}",
        "Correct the perspective of {object}",
        PRO_CONSTRAINTS,
        PRO_DECORATIVES,
    ),
    op(
        "content_aware_fill",
        Professional,
        "Fill {object} using content-aware fill: {text}",
        "Fill {object} using content-aware fill",
        REMOVAL_CONSTRAINTS,
        PRO_DECORATIVES,
    ),
    op(
        "seamless_blending",
        Professional,
        "Blend {object} seamlessly: {text}",
        "Blend {object} seamlessly into the scene",
        PRO_CONSTRAINTS,
        PRO_DECORATIVES,
    ),
    op(
        "relight_scene",
        Professional,
        "Relight {object}: {text}",
        "Relight {object} with studio lighting",
        PRO_CONSTRAINTS,
        PRO_DECORATIVES,
    ),
    FALLBACK_TEMPLATE,
];

// ─── Catalog ─────────────────────────────────────────────────────────────

/// Static registry of operation templates.
#[derive(Debug, Clone, Copy)]
pub struct TemplateCatalog {
    entries: &'static [OperationTemplate],
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateCatalog {
    pub const fn builtin() -> Self {
        Self { entries: BUILTIN }
    }

    pub fn get(&self, operation: &str) -> Option<&'static OperationTemplate> {
        let key = operation.trim();
        self.entries.iter().find(|t| t.key == key)
    }

    /// The entry for `operation`, or the generic fallback.
    pub fn get_or_fallback(&self, operation: Option<&str>) -> &'static OperationTemplate {
        match operation.and_then(|op| self.get(op)) {
            Some(t) => t,
            None => {
                if let Some(op) = operation {
                    log::debug!("unknown operation {op:?}, using generic template");
                }
                &FALLBACK_TEMPLATE
            }
        }
    }

    pub fn contains(&self, operation: &str) -> bool {
        self.get(operation).is_some()
    }

    pub fn category(&self, operation: &str) -> Option<OperationCategory> {
        self.get(operation).map(|t| t.category)
    }

    /// `None` for unknown operations.
    pub fn requires_selection(&self, operation: &str) -> Option<bool> {
        self.category(operation).map(OperationCategory::requires_selection)
    }

    pub fn operations_in(&self, category: OperationCategory) -> impl Iterator<Item = &'static str> {
        self.entries
            .iter()
            .filter(move |t| t.category == category)
            .map(|t| t.key)
    }

    pub fn constraint_options(&self, operation: &str) -> &'static [&'static str] {
        self.get(operation).map(|t| t.constraints).unwrap_or(&[])
    }

    pub fn decorative_options(&self, operation: &str) -> &'static [&'static str] {
        self.get(operation).map(|t| t.decoratives).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static OperationTemplate> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique() {
        let catalog = TemplateCatalog::builtin();
        let mut seen = HashSet::new();
        for t in catalog.iter() {
            assert!(seen.insert(t.key), "duplicate operation key {}", t.key);
        }
    }

    #[test]
    fn every_template_has_object_placeholder() {
        for t in TemplateCatalog::builtin().iter() {
            assert!(t.build_description("x").contains(OBJECT_TOKEN), "{}", t.key);
            assert!(t.build_description("").contains(OBJECT_TOKEN), "{}", t.key);
            assert!(!t.build_description("x").contains(TEXT_TOKEN), "{}", t.key);
        }
    }

    #[test]
    fn change_color_builder() {
        let catalog = TemplateCatalog::builtin();
        let t = catalog.get("change_color").unwrap();
        assert_eq!(
            t.build_description("bright red"),
            "Change the color of {object} to bright red"
        );
        assert_eq!(t.build_description("  "), "Change the color of {object}");
    }

    #[test]
    fn category_selection_rules() {
        let catalog = TemplateCatalog::builtin();
        assert_eq!(catalog.requires_selection("global_color_grade"), Some(false));
        assert_eq!(catalog.requires_selection("geometric_warp"), Some(false));
        assert_eq!(catalog.requires_selection("change_color"), Some(true));
        assert_eq!(catalog.requires_selection("text_add"), Some(true));
        assert_eq!(catalog.requires_selection("nope"), None);
    }

    #[test]
    fn categories_do_not_overlap() {
        let catalog = TemplateCatalog::builtin();
        let all = [
            OperationCategory::Global,
            OperationCategory::Local,
            OperationCategory::Text,
            OperationCategory::Professional,
        ];
        let total: usize = all.iter().map(|c| catalog.operations_in(*c).count()).sum();
        assert_eq!(total, catalog.iter().count());
        assert!(catalog.operations_in(OperationCategory::Text).all(|k| k.starts_with("text_")));
    }

    #[test]
    fn unknown_operation_uses_fallback() {
        let catalog = TemplateCatalog::builtin();
        assert_eq!(catalog.get_or_fallback(Some("mystery")).key, "custom");
        assert_eq!(catalog.get_or_fallback(None).key, "custom");
        assert!(catalog.constraint_options("mystery").is_empty());
        assert!(!catalog.decorative_options("add_object").is_empty());
    }
}
