//! Outbound AI-enhancement payloads.
//!
//! The remote call itself lives in the host. The session only builds the
//! request and accepts the returned string.

use serde::{Deserialize, Serialize};
use vp_core::model::Annotation;

/// Host-chosen knobs forwarded verbatim to the enhancement service.
#[derive(Debug, Clone, PartialEq)]
pub struct EnhanceSettings {
    /// Default: **"general_editing"**.
    pub editing_intent: String,
    /// Default: **"balanced"**.
    pub processing_style: String,
    /// Default: **0.7**.
    pub temperature: f64,
    /// `None` lets the service pick.
    pub seed: Option<u64>,
}

impl Default for EnhanceSettings {
    fn default() -> Self {
        Self {
            editing_intent: "general_editing".to_string(),
            processing_style: "balanced".to_string(),
            temperature: 0.7,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceRequest {
    /// The composed prompt to be rewritten.
    pub edit_description: String,
    pub editing_intent: String,
    pub processing_style: String,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Selected annotations at request time.
    pub annotation_snapshot: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceResponse {
    pub enhanced_prompt: String,
}

impl EnhanceRequest {
    pub fn new(
        edit_description: String,
        settings: &EnhanceSettings,
        annotation_snapshot: Vec<Annotation>,
    ) -> Self {
        Self {
            edit_description,
            editing_intent: settings.editing_intent.clone(),
            processing_style: settings.processing_style.clone(),
            temperature: settings.temperature,
            seed: settings.seed,
            annotation_snapshot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn request_uses_camel_case() {
        let req = EnhanceRequest::new("Edit it".into(), &EnhanceSettings::default(), vec![]);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "editDescription": "Edit it",
                "editingIntent": "general_editing",
                "processingStyle": "balanced",
                "temperature": 0.7,
                "annotationSnapshot": [],
            })
        );
    }

    #[test]
    fn response_reads_enhanced_prompt() {
        let resp: EnhanceResponse =
            serde_json::from_value(json!({ "enhancedPrompt": "Better" })).unwrap();
        assert_eq!(resp.enhanced_prompt, "Better");
    }
}
