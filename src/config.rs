//! Scene configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) reproduces the
//! stock scene: an `S` in plastic on the left, a `4` in metal on the right and
//! the light a unit in front of the origin.

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::CameraState;
use crate::error::ConfigError;
use crate::glyph::{FontLocation, GlyphOptions, GlyphRequest, GlyphRole, GlyphSpec};
use crate::input::KeyBindings;
use crate::light::LightSource;
use crate::shading::ambient_intensity_from;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub light: LightConfig,
    pub camera: CameraConfig,
    pub input: KeyBindings,
    pub glyphs: GlyphsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Glyph Lighting".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub position: Vec3,
    pub half_extent: f32,
    pub glow_intensity: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        let light = LightSource::default();
        Self {
            position: light.position,
            half_extent: light.visual_radius,
            glow_intensity: light.glow_intensity_scale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let camera = CameraState::default();
        Self {
            position: camera.position,
            fov: camera.fov_degrees,
            near: camera.near,
            far: camera.far,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlyphsConfig {
    pub font: FontLocation,
    pub size: f32,
    pub depth: f32,
    /// Ambient intensity in thousandths, shared by both materials.
    pub ambient_constant: u32,
    pub letter: GlyphSpec,
    pub digit: GlyphSpec,
}

impl Default for GlyphsConfig {
    fn default() -> Self {
        let options = GlyphOptions::default();
        Self {
            font: FontLocation::Builtin,
            size: options.size,
            depth: options.depth,
            ambient_constant: 314,
            letter: GlyphSpec {
                character: 'S',
                color: Vec3::new(0.0, 0.455, 0.455),
                offset: Vec3::new(-4.0, 0.0, 0.0),
            },
            digit: GlyphSpec {
                character: '4',
                color: Vec3::new(1.0, 0.545, 0.545),
                offset: Vec3::new(2.0, 0.0, 0.0),
            },
        }
    }
}

impl SceneConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let step = self.input.step;
        if !step.is_finite() || step == 0.0 {
            return Err(ConfigError::invalid("input.step", format!("{step} is not a usable step")));
        }
        let keys = self.input.keys();
        for (i, key) in keys.iter().enumerate() {
            if keys[i + 1..].contains(key) {
                return Err(ConfigError::invalid("input", format!("{key:?} is bound twice")));
            }
        }
        for (field, value) in [
            ("light.half_extent", self.light.half_extent),
            ("light.glow_intensity", self.light.glow_intensity),
            ("glyphs.size", self.glyphs.size),
            ("glyphs.depth", self.glyphs.depth),
            ("camera.fov", self.camera.fov),
            ("camera.near", self.camera.near),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::invalid(field, format!("{value} must be positive")));
            }
        }
        if self.camera.near >= self.camera.far {
            return Err(ConfigError::invalid("camera.far", "must exceed camera.near"));
        }
        for (role, spec, field) in [
            (GlyphRole::Letter, &self.glyphs.letter, "glyphs.letter.character"),
            (GlyphRole::Digit, &self.glyphs.digit, "glyphs.digit.character"),
        ] {
            if !role.accepts(spec.character) {
                return Err(ConfigError::invalid(
                    field,
                    format!("{:?} is not a valid {} glyph", spec.character, role.name()),
                ));
            }
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::invalid("window", "size must be non-zero"));
        }
        Ok(())
    }

    pub fn light_source(&self) -> LightSource {
        LightSource::new(
            self.light.position,
            self.light.half_extent,
            self.light.glow_intensity,
        )
    }

    pub fn camera_state(&self) -> CameraState {
        CameraState {
            position: self.camera.position,
            fov_degrees: self.camera.fov,
            near: self.camera.near,
            far: self.camera.far,
        }
    }

    pub fn glyph_request(&self) -> GlyphRequest {
        GlyphRequest {
            font: self.glyphs.font.clone(),
            options: GlyphOptions {
                size: self.glyphs.size,
                depth: self.glyphs.depth,
            },
            ambient_intensity: ambient_intensity_from(self.glyphs.ambient_constant),
            light_position: self.light.position,
            letter: self.glyphs.letter,
            digit: self.glyphs.digit,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_config_uses_stock_scene() {
        let config = SceneConfig::from_toml_str("").unwrap();
        assert_eq!(config, SceneConfig::default());
        assert_eq!(config.light.position, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(config.camera.position, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(config.input.light_up, 'w');
        let request = config.glyph_request();
        assert!((request.ambient_intensity - 0.314).abs() < 1e-6);
        assert_eq!(request.letter.character, 'S');
        assert_eq!(request.digit.character, '4');
    }

    #[test]
    fn partial_tables_override_only_named_fields() {
        let config = SceneConfig::from_toml_str(
            r#"
            [light]
            position = [1.0, 2.0, 3.0]

            [input]
            step = 0.25

            [glyphs]
            font = "glyphs/obj"

            [glyphs.digit]
            character = "7"
            color = [0.5, 0.5, 0.5]
            offset = [3.0, 0.0, 0.0]
            "#,
        )
        .unwrap();
        assert_eq!(config.light.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.light.half_extent, 0.5);
        assert_eq!(config.input.step, 0.25);
        assert_eq!(config.input.light_down, 's');
        assert_eq!(config.glyphs.font, FontLocation::Directory("glyphs/obj".into()));
        assert_eq!(config.glyphs.digit.character, '7');
        assert_eq!(config.glyphs.letter.character, 'S');
    }

    #[test]
    fn invalid_values_are_rejected() {
        let cases = [
            "[input]\nstep = 0.0",
            "[input]\ncamera_left = \"w\"",
            "[glyphs]\nsize = -1.0",
            "[camera]\nnear = 5.0\nfar = 1.0",
            "[glyphs.letter]\ncharacter = \"9\"\ncolor = [1.0, 1.0, 1.0]\noffset = [0.0, 0.0, 0.0]",
        ];
        for case in cases {
            assert!(
                matches!(SceneConfig::from_toml_str(case), Err(ConfigError::Invalid { .. })),
                "{case} should be invalid"
            );
        }
        assert!(matches!(
            SceneConfig::from_toml_str("[light\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[window]\ntitle = \"Demo\"").unwrap();
        let config = SceneConfig::load(file.path()).unwrap();
        assert_eq!(config.window.title, "Demo");
        assert_eq!(config.window.width, 1280);
        assert!(matches!(
            SceneConfig::load("/missing/scene.toml"),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn defaults_survive_a_round_trip_through_toml() {
        let text = toml::to_string(&SceneConfig::default()).unwrap();
        assert_eq!(SceneConfig::from_toml_str(&text).unwrap(), SceneConfig::default());
    }
}
