use std::sync::Arc;

use glam::Mat4;

use crate::glyph::GlyphRole;
use crate::light::LightSource;
use crate::mesh::Mesh;
use crate::shading::{MaterialKind, ShadingUniforms};
use crate::sync::GlyphState;

/// Stable identity of a render item, used to cache GPU resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemId {
    LightCube,
    Glyph(GlyphRole),
}

impl ItemId {
    pub fn label(self) -> &'static str {
        match self {
            Self::LightCube => "light-cube",
            Self::Glyph(GlyphRole::Letter) => "glyph-letter",
            Self::Glyph(GlyphRole::Digit) => "glyph-digit",
        }
    }
}

/// How a render item is coloured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemShading {
    /// Additive white glow, alpha `intensity_scale / |local position|`.
    Glow { intensity_scale: f32 },
    Lit {
        material: MaterialKind,
        uniforms: ShadingUniforms,
    },
}

#[derive(Debug, Clone)]
pub struct SceneItem {
    pub id: ItemId,
    pub mesh: Arc<Mesh>,
    pub model: Mat4,
    pub shading: ItemShading,
}

/// Snapshot of the render set for one frame.
///
/// The light cube is always present; the glyph surfaces join together once
/// their load has been committed.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub items: Vec<SceneItem>,
}

impl Scene {
    pub fn capture(light: &LightSource, light_mesh: &Arc<Mesh>, glyphs: &GlyphState) -> Self {
        let mut items = vec![SceneItem {
            id: ItemId::LightCube,
            mesh: Arc::clone(light_mesh),
            model: light.model_matrix(),
            shading: ItemShading::Glow {
                intensity_scale: light.glow_intensity_scale,
            },
        }];
        if let Some(set) = glyphs.glyphs() {
            items.extend(set.surfaces().into_iter().map(|surface| SceneItem {
                id: ItemId::Glyph(surface.role()),
                mesh: Arc::clone(surface.mesh()),
                model: surface.model_matrix(),
                shading: ItemShading::Lit {
                    material: surface.material(),
                    uniforms: *surface.uniforms(),
                },
            }));
        }
        Self { items }
    }

    pub fn get(&self, id: ItemId) -> Option<&SceneItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
