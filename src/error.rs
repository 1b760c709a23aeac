use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while parsing an OBJ mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("invalid vector on line {line}: {reason}")]
    Vector { line: usize, reason: String },
    #[error("invalid face on line {line}: {reason}")]
    Face { line: usize, reason: String },
    #[error("face references {kind} {index} but only {available} exist")]
    Index {
        kind: &'static str,
        index: i32,
        available: usize,
    },
    #[error("OBJ data does not define any vertices")]
    Empty,
}

/// Failures raised by the font collaborator or the glyph loader.
#[derive(Debug, Error)]
pub enum GlyphError {
    #[error("font `{font}` has no glyph for {character:?}")]
    UnsupportedCharacter { font: String, character: char },
    #[error("{character:?} cannot be used as the {slot} glyph")]
    WrongClass { character: char, slot: &'static str },
    #[error("glyph mesh {} not found", path.display())]
    MissingGlyph { path: PathBuf },
    #[error("font directory {} does not exist", path.display())]
    MissingFont { path: PathBuf },
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("glyph mesh for {character:?} is malformed")]
    Mesh {
        character: char,
        #[source]
        source: MeshError,
    },
    #[error("glyph loader thread panicked")]
    LoaderPanicked,
}

/// Failures raised while reading the scene configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
