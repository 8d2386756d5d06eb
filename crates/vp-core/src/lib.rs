pub mod compose;
pub mod geometry;
pub mod id;
pub mod model;
pub mod path;
pub mod scale;
pub mod templates;

pub use compose::{ComposeMode, ComposeOptions, ENTIRE_IMAGE, GlobalIntent, PromptComposer};
pub use geometry::{GeometrySource, Normalized, normalize_geometry, normalize_record};
pub use id::AnnotationId;
pub use model::*;
pub use scale::{ScaleInfo, Size};
pub use templates::{OperationCategory, OperationTemplate, TemplateCatalog};
