use glam::{Mat4, Vec3};

use crate::mesh::Mesh;

/// The single point light of the scene, drawn as a glowing cube.
///
/// `position` is the authoritative light position every shading model reads
/// (through the frame synchronizer, never directly).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSource {
    pub position: Vec3,
    /// Half-extent of the cube drawn at the light position.
    pub visual_radius: f32,
    pub glow_intensity_scale: f32,
}

impl Default for LightSource {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 1.0),
            visual_radius: 0.5,
            glow_intensity_scale: 1.5,
        }
    }
}

impl LightSource {
    pub fn new(position: Vec3, visual_radius: f32, glow_intensity_scale: f32) -> Self {
        Self {
            position,
            visual_radius,
            glow_intensity_scale,
        }
    }

    /// Glow alpha of the cube surface at `distance_from_origin` (in cube-local
    /// space). Returns +inf at distance 0.
    pub fn glow(&self, distance_from_origin: f32) -> f32 {
        self.glow_intensity_scale / distance_from_origin
    }

    pub fn glow_at(&self, local_point: Vec3) -> f32 {
        self.glow(local_point.length())
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
    }

    pub fn mesh(&self) -> Mesh {
        Mesh::cube(self.visual_radius)
    }
}
