//! Glyph meshes and the surfaces that pair them with a lighting model.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::{Mat4, Vec3, Vec4};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::GlyphError;
use crate::mesh::{BoxFaces, Mesh};
use crate::obj::parse_obj;
use crate::shading::{Fragment, MaterialKind, ShadingUniforms};

/// Size and extrusion depth of a glyph, in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlyphOptions {
    pub size: f32,
    pub depth: f32,
}

impl Default for GlyphOptions {
    fn default() -> Self {
        Self {
            size: 2.5,
            depth: 0.5,
        }
    }
}

/// Source of extruded glyph meshes.
pub trait Font: Send + Sync {
    fn name(&self) -> &str;

    /// Builds the mesh of `character` with its bottom-left-back corner at the
    /// origin, extruded along +Z.
    fn glyph_mesh(&self, character: char, options: &GlyphOptions) -> Result<Mesh, GlyphError>;
}

/// Where fonts come from: the built-in block font or a directory of
/// `<char>.obj` meshes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FontLocation {
    #[default]
    Builtin,
    Directory(PathBuf),
}

impl From<String> for FontLocation {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("builtin") {
            Self::Builtin
        } else {
            Self::Directory(PathBuf::from(value))
        }
    }
}

impl From<FontLocation> for String {
    fn from(value: FontLocation) -> Self {
        match value {
            FontLocation::Builtin => "builtin".to_string(),
            FontLocation::Directory(path) => path.display().to_string(),
        }
    }
}

impl fmt::Display for FontLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => f.write_str("builtin"),
            Self::Directory(path) => write!(f, "{}", path.display()),
        }
    }
}

pub fn load_font(location: &FontLocation) -> Result<Box<dyn Font>, GlyphError> {
    match location {
        FontLocation::Builtin => Ok(Box::new(BlockFont)),
        FontLocation::Directory(path) => Ok(Box::new(ObjFont::open(path)?)),
    }
}

/// 5x7 bitmap font; every lit cell becomes an extruded box.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockFont;

impl BlockFont {
    const COLUMNS: usize = 5;
    const ROWS: usize = 7;

    fn rows(character: char) -> Option<[u8; 7]> {
        let index = match character.to_ascii_uppercase() {
            c @ 'A'..='Z' => c as usize - 'A' as usize,
            c @ '0'..='9' => 26 + (c as usize - '0' as usize),
            _ => return None,
        };
        Some(BLOCK_GLYPHS[index])
    }

    fn lit(rows: &[u8; 7], column: isize, row: isize) -> bool {
        if column < 0 || row < 0 || column >= Self::COLUMNS as isize || row >= Self::ROWS as isize {
            return false;
        }
        rows[row as usize] & (1 << (Self::COLUMNS as isize - 1 - column)) != 0
    }
}

impl Font for BlockFont {
    fn name(&self) -> &str {
        "builtin"
    }

    fn glyph_mesh(&self, character: char, options: &GlyphOptions) -> Result<Mesh, GlyphError> {
        let rows = Self::rows(character).ok_or_else(|| GlyphError::UnsupportedCharacter {
            font: self.name().to_string(),
            character,
        })?;
        let cell = options.size / Self::ROWS as f32;
        let mut mesh = Mesh::new();
        for row in 0..Self::ROWS as isize {
            for column in 0..Self::COLUMNS as isize {
                if !Self::lit(&rows, column, row) {
                    continue;
                }
                let min = Vec3::new(
                    column as f32 * cell,
                    (Self::ROWS as isize - 1 - row) as f32 * cell,
                    0.0,
                );
                let max = min + Vec3::new(cell, cell, options.depth);
                let faces = BoxFaces {
                    left: !Self::lit(&rows, column - 1, row),
                    right: !Self::lit(&rows, column + 1, row),
                    top: !Self::lit(&rows, column, row - 1),
                    bottom: !Self::lit(&rows, column, row + 1),
                    back: true,
                    front: true,
                };
                mesh.push_box(min, max, faces);
            }
        }
        Ok(mesh)
    }
}

#[rustfmt::skip]
const BLOCK_GLYPHS: [[u8; 7]; 36] = [
    [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001], // A
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110], // B
    [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110], // C
    [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110], // D
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111], // E
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000], // F
    [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111], // G
    [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001], // H
    [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // I
    [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100], // J
    [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001], // K
    [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111], // L
    [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001], // M
    [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001], // N
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // O
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000], // P
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101], // Q
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001], // R
    [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110], // S
    [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100], // T
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // U
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100], // V
    [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010], // W
    [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001], // X
    [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100], // Y
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111], // Z
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110], // 0
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // 1
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111], // 2
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110], // 3
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010], // 4
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110], // 5
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110], // 6
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000], // 7
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110], // 8
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100], // 9
];

/// Font backed by a directory holding one OBJ mesh per character
/// (`S.obj`, `4.obj`, ...). Meshes are fitted to the requested glyph box.
#[derive(Debug, Clone)]
pub struct ObjFont {
    root: PathBuf,
    name: String,
}

impl ObjFont {
    pub fn open(root: impl AsRef<Path>) -> Result<Self, GlyphError> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(GlyphError::MissingFont { path: root });
        }
        let name = root.display().to_string();
        Ok(Self { root, name })
    }

    fn glyph_path(&self, character: char) -> PathBuf {
        self.root.join(format!("{character}.obj"))
    }
}

impl Font for ObjFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn glyph_mesh(&self, character: char, options: &GlyphOptions) -> Result<Mesh, GlyphError> {
        if !character.is_alphanumeric() {
            return Err(GlyphError::UnsupportedCharacter {
                font: self.name.clone(),
                character,
            });
        }
        let path = self.glyph_path(character);
        if !path.is_file() {
            return Err(GlyphError::MissingGlyph { path });
        }
        let text = fs::read_to_string(&path).map_err(|source| GlyphError::Io {
            path: path.clone(),
            source,
        })?;
        let mut mesh =
            parse_obj(&text).map_err(|source| GlyphError::Mesh { character, source })?;
        mesh.fit_to_box(options.size, options.depth);
        debug!(
            "loaded glyph {character:?} from {} ({} triangles)",
            path.display(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }
}

/// The two glyph slots of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlyphRole {
    /// Alphabetic glyph, left slot, plastic model.
    Letter,
    /// Numeric glyph, right slot, metal model.
    Digit,
}

impl GlyphRole {
    pub fn material(self) -> MaterialKind {
        match self {
            Self::Letter => MaterialKind::Plastic,
            Self::Digit => MaterialKind::Metal,
        }
    }

    pub fn accepts(self, character: char) -> bool {
        match self {
            Self::Letter => character.is_alphabetic(),
            Self::Digit => character.is_ascii_digit(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Letter => "letter",
            Self::Digit => "digit",
        }
    }
}

/// Character, colour and placement of one glyph slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlyphSpec {
    pub character: char,
    pub color: Vec3,
    pub offset: Vec3,
}

/// Everything the loader needs to build both glyph surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRequest {
    pub font: FontLocation,
    pub options: GlyphOptions,
    pub ambient_intensity: f32,
    pub light_position: Vec3,
    pub letter: GlyphSpec,
    pub digit: GlyphSpec,
}

/// A glyph mesh bound to one lighting model at a fixed world offset.
#[derive(Debug, Clone)]
pub struct GlyphSurface {
    role: GlyphRole,
    character: char,
    mesh: Arc<Mesh>,
    offset: Vec3,
    uniforms: ShadingUniforms,
}

impl GlyphSurface {
    pub fn build(
        font: &dyn Font,
        role: GlyphRole,
        spec: &GlyphSpec,
        request: &GlyphRequest,
    ) -> Result<Self, GlyphError> {
        if !role.accepts(spec.character) {
            return Err(GlyphError::WrongClass {
                character: spec.character,
                slot: role.name(),
            });
        }
        let mesh = font.glyph_mesh(spec.character, &request.options)?;
        let uniforms = ShadingUniforms::new(
            role.material(),
            spec.color,
            request.ambient_intensity,
            request.light_position,
        );
        Ok(Self {
            role,
            character: spec.character,
            mesh: Arc::new(mesh),
            offset: spec.offset,
            uniforms,
        })
    }

    pub fn role(&self) -> GlyphRole {
        self.role
    }

    pub fn character(&self) -> char {
        self.character
    }

    pub fn material(&self) -> MaterialKind {
        self.role.material()
    }

    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    pub fn uniforms(&self) -> &ShadingUniforms {
        &self.uniforms
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.offset)
    }

    pub(crate) fn set_light_position(&mut self, position: Vec3) {
        self.uniforms.light_position = position;
    }

    /// Shades a point given in mesh-local coordinates.
    pub fn shade_local(&self, normal: Vec3, local_position: Vec3) -> Vec4 {
        let fragment = Fragment::new(normal, local_position + self.offset);
        self.material().model().shade(&fragment, &self.uniforms)
    }

    /// Shades the centre of the glyph's front face.
    pub fn shade_front_centre(&self) -> Vec4 {
        let centre = self
            .mesh
            .bounds()
            .map(|(min, max)| Vec3::new((min.x + max.x) * 0.5, (min.y + max.y) * 0.5, max.z))
            .unwrap_or(Vec3::ZERO);
        self.shade_local(Vec3::Z, centre)
    }
}

/// The letter and digit surfaces, built together and committed together.
#[derive(Debug, Clone)]
pub struct GlyphSet {
    pub letter: GlyphSurface,
    pub digit: GlyphSurface,
}

impl GlyphSet {
    pub fn build(font: &dyn Font, request: &GlyphRequest) -> Result<Self, GlyphError> {
        Ok(Self {
            letter: GlyphSurface::build(font, GlyphRole::Letter, &request.letter, request)?,
            digit: GlyphSurface::build(font, GlyphRole::Digit, &request.digit, request)?,
        })
    }

    pub fn surfaces(&self) -> [&GlyphSurface; 2] {
        [&self.letter, &self.digit]
    }

    pub(crate) fn set_light_position(&mut self, position: Vec3) {
        self.letter.set_light_position(position);
        self.digit.set_light_position(position);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::shading::ambient_intensity_from;

    fn request() -> GlyphRequest {
        GlyphRequest {
            font: FontLocation::Builtin,
            options: GlyphOptions::default(),
            ambient_intensity: ambient_intensity_from(314),
            light_position: Vec3::new(0.0, 0.0, 1.0),
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

    #[test]
    fn block_font_covers_letters_and_digits() {
        let options = GlyphOptions::default();
        for ch in ('A'..='Z').chain('a'..='z').chain('0'..='9') {
            let mesh = BlockFont.glyph_mesh(ch, &options).unwrap();
            assert!(!mesh.is_empty(), "{ch:?} has no geometry");
        }
        assert!(matches!(
            BlockFont.glyph_mesh('#', &options),
            Err(GlyphError::UnsupportedCharacter { character: '#', .. })
        ));
    }

    #[test]
    fn block_glyph_fits_requested_box() {
        let mesh = BlockFont.glyph_mesh('S', &GlyphOptions::default()).unwrap();
        let (min, max) = mesh.bounds().unwrap();
        assert!(min.abs_diff_eq(Vec3::ZERO, 1e-6));
        assert!((max.y - 2.5).abs() < 1e-5);
        assert!((max.z - 0.5).abs() < 1e-6);
        assert!((max.x - 2.5 * 5.0 / 7.0).abs() < 1e-5);
    }

    #[test]
    fn shared_cell_walls_are_omitted() {
        // 'L' = 6 cells in the stem plus 5 in the foot, 11 boxes; joined cells
        // lose the faces between them.
        let mesh = BlockFont.glyph_mesh('L', &GlyphOptions::default()).unwrap();
        let full = 11 * 12;
        assert!(mesh.triangle_count() < full);
        // front and back of every cell are always present
        let facing = (0..mesh.vertex_count())
            .filter(|&i| mesh.normal(i).z.abs() > 0.5)
            .count();
        assert_eq!(facing, 11 * 2 * 4);
    }

    #[test]
    fn glyph_set_binds_letter_to_plastic_and_digit_to_metal() {
        let set = GlyphSet::build(&BlockFont, &request()).unwrap();
        assert_eq!(set.letter.material(), MaterialKind::Plastic);
        assert_eq!(set.digit.material(), MaterialKind::Metal);
        assert_eq!(set.letter.uniforms().specular_exponent, 16.0);
        assert_eq!(set.digit.uniforms().specular_exponent, 64.0);
        assert_eq!(set.letter.offset(), Vec3::new(-4.0, 0.0, 0.0));
        assert_eq!(set.digit.offset(), Vec3::new(2.0, 0.0, 0.0));
        for surface in set.surfaces() {
            assert!((surface.uniforms().ambient_intensity - 0.314).abs() < 1e-6);
        }
    }

    #[test]
    fn glyph_set_rejects_swapped_characters() {
        let mut swapped = request();
        std::mem::swap(&mut swapped.letter.character, &mut swapped.digit.character);
        assert!(matches!(
            GlyphSet::build(&BlockFont, &swapped),
            Err(GlyphError::WrongClass { slot: "letter", .. })
        ));
    }

    #[test]
    fn front_centre_is_lit_by_light_in_front() {
        let set = GlyphSet::build(&BlockFont, &request()).unwrap();
        let base = set.digit.uniforms().base_color;
        let color = set.digit.shade_front_centre();
        assert!(color.truncate().cmpgt(base * 0.314).any());
    }

    #[test]
    fn obj_font_reads_and_fits_glyphs() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join("S.obj")).unwrap();
        writeln!(file, "v 0 0 0\nv 2 0 0\nv 2 4 1\nv 0 4 1\nf 1 2 3 4").unwrap();

        let font = load_font(&FontLocation::Directory(dir.path().to_path_buf())).unwrap();
        let mesh = font.glyph_mesh('S', &GlyphOptions::default()).unwrap();
        let (min, max) = mesh.bounds().unwrap();
        assert!(min.abs_diff_eq(Vec3::ZERO, 1e-6));
        assert!(max.abs_diff_eq(Vec3::new(1.25, 2.5, 0.5), 1e-5));

        assert!(matches!(
            font.glyph_mesh('4', &GlyphOptions::default()),
            Err(GlyphError::MissingGlyph { .. })
        ));
    }

    #[test]
    fn missing_font_directory_is_an_error() {
        let location = FontLocation::from("/definitely/not/here".to_string());
        assert!(matches!(
            load_font(&location),
            Err(GlyphError::MissingFont { .. })
        ));
        assert_eq!(FontLocation::from("Builtin".to_string()), FontLocation::Builtin);
    }
}
