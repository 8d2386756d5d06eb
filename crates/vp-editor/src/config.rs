use vp_core::model::{DEFAULT_OPACITY, FillMode, PaletteColor};

/// Editor behavior knobs.
///
/// Defaults match the canvas the position thresholds were tuned for.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Translation applied to both axes by `duplicate`. Default: **20.0**.
    pub duplicate_offset: f64,

    /// Color for annotations created without one, and for persisted
    /// annotations whose color is unreadable. Default: **red**.
    pub default_color: PaletteColor,

    /// Default: **filled**.
    pub default_fill_mode: FillMode,

    /// Default: **50**.
    pub default_opacity: u8,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            duplicate_offset: 20.0,
            default_color: PaletteColor::Red,
            default_fill_mode: FillMode::Filled,
            default_opacity: DEFAULT_OPACITY,
        }
    }
}
