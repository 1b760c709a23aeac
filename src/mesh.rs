use glam::Vec3;

/// Number of floats per interleaved vertex: `position.xyz` then `normal.xyz`.
pub const FLOATS_PER_VERTEX: usize = 6;

/// Indexed triangle mesh with interleaved position/normal vertices.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

/// Selects which faces of an axis-aligned box are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxFaces {
    pub left: bool,
    pub right: bool,
    pub bottom: bool,
    pub top: bool,
    pub back: bool,
    pub front: bool,
}

impl BoxFaces {
    pub const ALL: Self = Self {
        left: true,
        right: true,
        bottom: true,
        top: true,
        back: true,
        front: true,
    };
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Axis-aligned cube centred on the origin with flat per-face normals.
    pub fn cube(half_extent: f32) -> Self {
        let mut mesh = Self::new();
        mesh.push_box(Vec3::splat(-half_extent), Vec3::splat(half_extent), BoxFaces::ALL);
        mesh
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / FLOATS_PER_VERTEX
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn position(&self, index: usize) -> Vec3 {
        let base = index * FLOATS_PER_VERTEX;
        Vec3::from_slice(&self.vertices[base..base + 3])
    }

    pub fn normal(&self, index: usize) -> Vec3 {
        let base = index * FLOATS_PER_VERTEX + 3;
        Vec3::from_slice(&self.vertices[base..base + 3])
    }

    pub(crate) fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&[
            position.x, position.y, position.z, normal.x, normal.y, normal.z,
        ]);
        index
    }

    /// Appends a quad whose corners wind counter-clockwise seen from `normal`.
    pub fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3) {
        let base = self.push_vertex(corners[0], normal);
        for corner in &corners[1..] {
            self.push_vertex(*corner, normal);
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    pub fn push_box(&mut self, min: Vec3, max: Vec3, faces: BoxFaces) {
        let (x0, y0, z0) = (min.x, min.y, min.z);
        let (x1, y1, z1) = (max.x, max.y, max.z);
        let v = Vec3::new;
        if faces.front {
            self.push_quad(
                [v(x0, y0, z1), v(x1, y0, z1), v(x1, y1, z1), v(x0, y1, z1)],
                Vec3::Z,
            );
        }
        if faces.back {
            self.push_quad(
                [v(x1, y0, z0), v(x0, y0, z0), v(x0, y1, z0), v(x1, y1, z0)],
                Vec3::NEG_Z,
            );
        }
        if faces.left {
            self.push_quad(
                [v(x0, y0, z0), v(x0, y0, z1), v(x0, y1, z1), v(x0, y1, z0)],
                Vec3::NEG_X,
            );
        }
        if faces.right {
            self.push_quad(
                [v(x1, y0, z1), v(x1, y0, z0), v(x1, y1, z0), v(x1, y1, z1)],
                Vec3::X,
            );
        }
        if faces.bottom {
            self.push_quad(
                [v(x0, y0, z0), v(x1, y0, z0), v(x1, y0, z1), v(x0, y0, z1)],
                Vec3::NEG_Y,
            );
        }
        if faces.top {
            self.push_quad(
                [v(x0, y1, z1), v(x1, y1, z1), v(x1, y1, z0), v(x0, y1, z0)],
                Vec3::Y,
            );
        }
    }

    /// Returns the `(min, max)` corners of the mesh, or `None` when it has no vertices.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        (0..self.vertex_count())
            .map(|i| self.position(i))
            .fold(None, |acc, p| match acc {
                None => Some((p, p)),
                Some((min, max)) => Some((min.min(p), max.max(p))),
            })
    }

    /// Rescales the mesh so its height equals `size` and its z extent equals
    /// `depth`, with the minimum corner moved to the origin.
    ///
    /// Flat meshes (zero z extent) keep their z scale. Normals are corrected for
    /// the non-uniform scale.
    pub fn fit_to_box(&mut self, size: f32, depth: f32) {
        let Some((min, max)) = self.bounds() else {
            return;
        };
        let extent = max - min;
        if extent.y <= f32::EPSILON {
            return;
        }
        let planar = size / extent.y;
        let z = if extent.z > f32::EPSILON {
            depth / extent.z
        } else {
            1.0
        };
        let scale = Vec3::new(planar, planar, z);
        for chunk in self.vertices.chunks_exact_mut(FLOATS_PER_VERTEX) {
            let position = (Vec3::from_slice(&chunk[..3]) - min) * scale;
            let normal = (Vec3::from_slice(&chunk[3..]) / scale).normalize_or_zero();
            chunk[..3].copy_from_slice(&position.to_array());
            chunk[3..].copy_from_slice(&normal.to_array());
        }
    }
}
