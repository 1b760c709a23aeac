use std::collections::HashMap;

use glam::Vec3;

use crate::error::MeshError;
use crate::mesh::Mesh;

/// Parses Wavefront OBJ text into an interleaved [`Mesh`].
///
/// Only `v`, `vn` and `f` records are read; polygons are fan-triangulated and
/// texture coordinates are ignored. Triangles whose corners lack a normal are
/// emitted unwelded with their flat face normal.
pub fn parse_obj(data: &str) -> Result<Mesh, MeshError> {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut triangles: Vec<[Corner; 3]> = Vec::new();

    for (index, raw) in data.lines().enumerate() {
        let line = index + 1;
        let record = raw.trim();
        if record.is_empty() || record.starts_with('#') {
            continue;
        }
        let mut fields = record.split_whitespace();
        match fields.next() {
            Some("v") => positions.push(read_vec3(fields, line)?),
            Some("vn") => normals.push(read_vec3(fields, line)?),
            Some("f") => {
                let polygon = read_face(fields, line)?;
                for i in 1..polygon.len() - 1 {
                    triangles.push([polygon[0], polygon[i], polygon[i + 1]]);
                }
            }
            _ => {}
        }
    }

    if positions.is_empty() {
        return Err(MeshError::Empty);
    }

    let mut mesh = Mesh::new();
    let mut welded: HashMap<(usize, usize), u32> = HashMap::new();
    for triangle in &triangles {
        let mut corners = [(0, None); 3];
        for (slot, corner) in corners.iter_mut().zip(triangle) {
            *slot = (
                resolve_ref("vertex", corner.position, positions.len())?,
                match corner.normal {
                    0 => None,
                    index => Some(resolve_ref("normal", index, normals.len())?),
                },
            );
        }

        if let [(a, Some(na)), (b, Some(nb)), (c, Some(nc))] = corners {
            for key in [(a, na), (b, nb), (c, nc)] {
                let vertex = match welded.get(&key) {
                    Some(vertex) => *vertex,
                    None => {
                        let vertex = mesh.push_vertex(positions[key.0], normals[key.1]);
                        welded.insert(key, vertex);
                        vertex
                    }
                };
                mesh.indices.push(vertex);
            }
        } else {
            // Without explicit normals every triangle keeps its own flat normal.
            let [pa, pb, pc] = corners.map(|(position, _)| positions[position]);
            let normal = (pb - pa).cross(pc - pa).normalize_or_zero();
            for position in [pa, pb, pc] {
                let vertex = mesh.push_vertex(position, normal);
                mesh.indices.push(vertex);
            }
        }
    }

    Ok(mesh)
}

#[derive(Debug, Clone, Copy)]
struct Corner {
    position: i32,
    normal: i32,
}

fn read_vec3<'a>(mut fields: impl Iterator<Item = &'a str>, line: usize) -> Result<Vec3, MeshError> {
    let mut component = || -> Result<f32, MeshError> {
        let text = fields.next().ok_or_else(|| MeshError::Vector {
            line,
            reason: "expected three components".into(),
        })?;
        text.parse::<f32>().map_err(|err| MeshError::Vector {
            line,
            reason: format!("`{text}`: {err}"),
        })
    };
    Ok(Vec3::new(component()?, component()?, component()?))
}

fn read_face<'a>(fields: impl Iterator<Item = &'a str>, line: usize) -> Result<Vec<Corner>, MeshError> {
    let corners = fields
        .map(|field| -> Result<Corner, MeshError> {
            let mut refs = field.split('/');
            let position = refs
                .next()
                .unwrap_or_default()
                .parse::<i32>()
                .map_err(|err| MeshError::Face {
                    line,
                    reason: format!("`{field}`: {err}"),
                })?;
            let normal = match refs.nth(1).filter(|text| !text.is_empty()) {
                Some(text) => text.parse::<i32>().map_err(|err| MeshError::Face {
                    line,
                    reason: format!("`{field}` normal: {err}"),
                })?,
                None => 0,
            };
            Ok(Corner { position, normal })
        })
        .collect::<Result<Vec<_>, MeshError>>()?;
    if corners.len() < 3 {
        return Err(MeshError::Face {
            line,
            reason: "faces need at least three corners".into(),
        });
    }
    Ok(corners)
}

/// Converts a one-based (or negative, end-relative) OBJ index into a slice index.
fn resolve(index: i32, len: usize) -> Option<usize> {
    match index {
        0 => None,
        i if i > 0 => Some(i as usize - 1).filter(|&i| i < len),
        i => len.checked_sub(i.unsigned_abs() as usize),
    }
}

fn resolve_ref(kind: &'static str, index: i32, len: usize) -> Result<usize, MeshError> {
    resolve(index, len).ok_or(MeshError::Index {
        kind,
        index,
        available: len,
    })
}
