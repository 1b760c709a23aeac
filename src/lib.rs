//! Point-light scene with two hand-written shading models.
//!
//! A small cube marks a movable point light. Two extruded glyphs sit in front
//! of the camera: a letter shaded as plastic (white highlight) and a digit
//! shaded as metal (highlight tinted by its base colour). Every frame the
//! light position is copied into both materials before drawing.
//!
//! Everything except [`render`] is plain CPU-side state, so the frame loop can
//! be driven and inspected without a window or GPU.

pub mod camera;
pub mod config;
pub mod error;
pub mod glyph;
pub mod input;
pub mod light;
pub mod loader;
pub mod mesh;
pub mod obj;
pub mod render;
pub mod scene;
pub mod session;
pub mod shading;
pub mod sync;

pub use camera::CameraState;
pub use config::SceneConfig;
pub use error::{ConfigError, GlyphError, MeshError};
pub use glyph::{BlockFont, Font, FontLocation, GlyphRole, GlyphSet, GlyphSurface, ObjFont};
pub use input::{InputAction, InputController, KeyBindings, KeyCode};
pub use light::LightSource;
pub use loader::PendingGlyphs;
pub use mesh::Mesh;
pub use obj::parse_obj;
pub use render::Renderer;
pub use scene::{ItemId, ItemShading, Scene, SceneItem};
pub use session::{FrameReport, Session};
pub use shading::{
    Fragment, LightingTerms, MaterialKind, MetalModel, PlasticModel, ShadingModel,
    ShadingUniforms,
};
pub use sync::{FrameSynchronizer, GlyphState, SyncOutcome};
