//! Per-fragment lighting models for the glyph surfaces.
//!
//! Both models share the same ambient + diffuse + specular structure and only
//! differ in the specular exponent and in how the highlight is coloured. The
//! WGSL in [`crate::render`] evaluates the same algebra on the GPU; the code
//! here is the reference used by tests and the headless mode.

use glam::{Vec3, Vec4};

/// Specular exponent of the plastic model.
pub const PLASTIC_SPECULAR_EXPONENT: f32 = 16.0;
/// Specular exponent of the metal model.
pub const METAL_SPECULAR_EXPONENT: f32 = 64.0;

/// Converts the configured ambient constant into an intensity (`314 -> 0.314`).
pub fn ambient_intensity_from(constant: u32) -> f32 {
    constant as f32 / 1000.0
}

/// Uniform inputs of one material.
///
/// `light_position` is a copy of the light position taken by the frame
/// synchronizer, not a live reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingUniforms {
    pub light_position: Vec3,
    pub base_color: Vec3,
    pub ambient_intensity: f32,
    pub specular_exponent: f32,
}

impl ShadingUniforms {
    pub fn new(
        material: MaterialKind,
        base_color: Vec3,
        ambient_intensity: f32,
        light_position: Vec3,
    ) -> Self {
        Self {
            light_position,
            base_color,
            ambient_intensity,
            specular_exponent: material.specular_exponent(),
        }
    }
}

/// Interpolated per-fragment inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub normal: Vec3,
    pub world_position: Vec3,
}

impl Fragment {
    pub fn new(normal: Vec3, world_position: Vec3) -> Self {
        Self {
            normal,
            world_position,
        }
    }
}

/// The three additive lighting contributions of one fragment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingTerms {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    /// `max(dot(N, L), 0)`.
    pub lambert: f32,
    /// Highlight strength after the exponent, before tinting.
    pub highlight: f32,
}

impl LightingTerms {
    /// Unclamped sum of the three terms with alpha 1.
    pub fn color(&self) -> Vec4 {
        (self.ambient + self.diffuse + self.specular).extend(1.0)
    }
}

/// GLSL-style reflection of the incident vector `incident` about `normal`.
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * normal.dot(incident) * normal
}

/// A per-fragment lighting function.
pub trait ShadingModel {
    fn kind(&self) -> MaterialKind;

    /// Colour of the specular highlight for a given base colour.
    fn specular_color(&self, base_color: Vec3) -> Vec3;

    fn terms(&self, fragment: &Fragment, uniforms: &ShadingUniforms) -> LightingTerms {
        let normal = fragment.normal.normalize_or_zero();
        let light_dir = (uniforms.light_position - fragment.world_position).normalize_or_zero();
        let lambert = normal.dot(light_dir).max(0.0);

        // Surfaces facing away from the light get no highlight either.
        let highlight = if lambert > 0.0 {
            let view_dir = (-fragment.world_position).normalize_or_zero();
            let reflect_dir = reflect(-light_dir, normal);
            view_dir
                .dot(reflect_dir)
                .max(0.0)
                .powf(uniforms.specular_exponent)
        } else {
            0.0
        };

        LightingTerms {
            ambient: uniforms.base_color * uniforms.ambient_intensity,
            diffuse: uniforms.base_color * lambert,
            specular: self.specular_color(uniforms.base_color) * highlight,
            lambert,
            highlight,
        }
    }

    fn shade(&self, fragment: &Fragment, uniforms: &ShadingUniforms) -> Vec4 {
        self.terms(fragment, uniforms).color()
    }
}

/// Colourless highlight, exponent 16.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlasticModel;

impl ShadingModel for PlasticModel {
    fn kind(&self) -> MaterialKind {
        MaterialKind::Plastic
    }

    fn specular_color(&self, _base_color: Vec3) -> Vec3 {
        Vec3::ONE
    }
}

/// Highlight tinted by the base colour, exponent 64.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetalModel;

impl ShadingModel for MetalModel {
    fn kind(&self) -> MaterialKind {
        MaterialKind::Metal
    }

    fn specular_color(&self, base_color: Vec3) -> Vec3 {
        base_color
    }
}

/// Which lighting model a glyph surface is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    Plastic,
    Metal,
}

impl MaterialKind {
    pub fn specular_exponent(self) -> f32 {
        match self {
            Self::Plastic => PLASTIC_SPECULAR_EXPONENT,
            Self::Metal => METAL_SPECULAR_EXPONENT,
        }
    }

    pub fn model(self) -> &'static dyn ShadingModel {
        match self {
            Self::Plastic => &PlasticModel,
            Self::Metal => &MetalModel,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Plastic => "plastic",
            Self::Metal => "metal",
        }
    }
}

impl std::fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;

    fn uniforms(kind: MaterialKind, base_color: Vec3, light: Vec3) -> ShadingUniforms {
        ShadingUniforms::new(kind, base_color, ambient_intensity_from(314), light)
    }

    #[test]
    fn ambient_constant_maps_to_intensity() {
        assert_relative_eq!(ambient_intensity_from(314), 0.314);
        let plastic = uniforms(MaterialKind::Plastic, Vec3::ONE, Vec3::ZERO);
        let metal = uniforms(MaterialKind::Metal, Vec3::ONE, Vec3::ZERO);
        assert_eq!(plastic.ambient_intensity, metal.ambient_intensity);
        assert_eq!(plastic.specular_exponent, 16.0);
        assert_eq!(metal.specular_exponent, 64.0);
    }

    #[test]
    fn reflect_matches_glsl() {
        let r = reflect(Vec3::new(1.0, -1.0, 0.0), Vec3::Y);
        assert_eq!(r, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn back_facing_fragments_only_receive_ambient() {
        let base = Vec3::new(0.0, 0.455, 0.455);
        // light behind the surface, viewer in front of it
        let fragment = Fragment::new(Vec3::Z, Vec3::new(0.0, 0.0, -2.0));
        for kind in [MaterialKind::Plastic, MaterialKind::Metal] {
            let u = uniforms(kind, base, Vec3::new(0.3, 0.0, -5.0));
            let terms = kind.model().terms(&fragment, &u);
            assert_eq!(terms.diffuse, Vec3::ZERO);
            assert_eq!(terms.specular, Vec3::ZERO);
            assert!(terms.color().truncate().abs_diff_eq(base * 0.314, 1e-6));
        }
    }

    #[test]
    fn grazing_light_gives_no_diffuse_or_specular() {
        let fragment = Fragment::new(Vec3::Z, Vec3::new(0.0, 0.0, -1.0));
        let u = uniforms(MaterialKind::Plastic, Vec3::ONE, Vec3::new(4.0, 0.0, -1.0));
        let terms = PlasticModel.terms(&fragment, &u);
        assert_eq!(terms.lambert, 0.0);
        assert_eq!(terms.specular, Vec3::ZERO);
    }

    #[test]
    fn head_on_light_saturates_diffuse_and_specular() {
        // viewer at the origin, surface facing it, light at the viewer
        let fragment = Fragment::new(Vec3::Z, Vec3::new(0.0, 0.0, -3.0));
        let base = Vec3::new(1.0, 0.545, 0.545);
        let u = uniforms(MaterialKind::Metal, base, Vec3::ZERO);
        let color = MetalModel.shade(&fragment, &u);
        let expected = base * 0.314 + base + base;
        assert!(color.truncate().abs_diff_eq(expected, 1e-5));
        assert_eq!(color.w, 1.0);
        assert!(color.x > 1.0, "output is not clamped");
    }

    #[test]
    fn metal_highlight_vanishes_for_black_base() {
        let fragment = Fragment::new(Vec3::Z, Vec3::new(0.0, 0.0, -3.0));
        let u = uniforms(MaterialKind::Metal, Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        let terms = MetalModel.terms(&fragment, &u);
        assert!(terms.highlight > 0.0);
        assert_eq!(terms.specular, Vec3::ZERO);
    }

    #[test]
    fn plastic_highlight_ignores_base_color() {
        let fragment = Fragment::new(Vec3::new(0.2, 0.1, 1.0), Vec3::new(0.5, 0.0, -3.0));
        let light = Vec3::new(1.0, 2.0, 1.0);
        let a = PlasticModel.terms(&fragment, &uniforms(MaterialKind::Plastic, Vec3::ZERO, light));
        let b = PlasticModel.terms(&fragment, &uniforms(MaterialKind::Plastic, Vec3::ONE, light));
        let c = PlasticModel.terms(
            &fragment,
            &uniforms(MaterialKind::Plastic, Vec3::new(0.3, 0.9, 0.1), light),
        );
        assert!(a.specular.length() > 0.0);
        assert_eq!(a.specular, b.specular);
        assert_eq!(a.specular, c.specular);
        assert_abs_diff_eq!(a.specular.x, a.highlight);
    }

    #[test]
    fn metal_falloff_is_narrower_than_plastic() {
        let light = Vec3::new(0.0, 0.0, 1.0);
        let mut previous_ratio = f32::INFINITY;
        for step in 1..6 {
            let tilt = step as f32 * 0.05;
            let fragment = Fragment::new(Vec3::new(tilt, 0.0, 1.0), Vec3::new(0.0, 0.0, -3.0));
            let plastic = PlasticModel.terms(&fragment, &uniforms(MaterialKind::Plastic, Vec3::ONE, light));
            let metal = MetalModel.terms(&fragment, &uniforms(MaterialKind::Metal, Vec3::ONE, light));
            assert!(metal.highlight < plastic.highlight);
            let ratio = metal.highlight / plastic.highlight;
            assert!(ratio < previous_ratio);
            previous_ratio = ratio;
        }
    }

    #[test]
    fn coincident_light_and_fragment_is_ambient_only() {
        let p = Vec3::new(1.0, 1.0, 1.0);
        let fragment = Fragment::new(Vec3::Y, p);
        let terms = PlasticModel.terms(&fragment, &uniforms(MaterialKind::Plastic, Vec3::ONE, p));
        assert!(terms.color().is_finite());
        assert_eq!(terms.diffuse, Vec3::ZERO);
    }
}
