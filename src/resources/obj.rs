//! Wavefront OBJ subset: `v`, `vt`, `vn` and triangle/quad `f` statements.
//!
//! Face corners are `position/uv/normal` triples with 1-based indices. Any
//! component may be left empty (`1//3`, `1`), in which case it is absent and not
//! applied. Quads are split into `(0, 1, 2)` and `(0, 2, 3)`. Comments and
//! unknown statements (`o`, `g`, `s`, `usemtl`, ...) are ignored.

use std::fmt::Write as _;
use std::path::Path;

use glam::{Vec2, Vec3};

use crate::errors::{EngineError, Result};
use crate::resources::mesh::StaticMesh;

/// One face corner; `None` marks an absent component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Corner {
    position: usize,
    uv: Option<usize>,
    normal: Option<usize>,
}

fn parse_error(line: usize, message: impl Into<String>) -> EngineError {
    EngineError::ModelParse {
        line,
        message: message.into(),
    }
}

fn parse_floats<const N: usize>(line: usize, parts: &[&str]) -> Result<[f32; N]> {
    if parts.len() < N {
        return Err(parse_error(
            line,
            format!("expected {N} numbers, found {}", parts.len()),
        ));
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|_| parse_error(line, format!("invalid number {part:?}")))?;
    }
    Ok(out)
}

/// Resolves a 1-based (or negative, relative) OBJ index against `count` entries.
fn resolve_index(line: usize, raw: &str, count: usize, what: &str) -> Result<Option<usize>> {
    if raw.is_empty() {
        return Ok(None);
    }
    let value: i64 = raw
        .parse()
        .map_err(|_| parse_error(line, format!("invalid {what} index {raw:?}")))?;
    let resolved = match value {
        0 => None,
        v if v > 0 => Some(v as usize - 1),
        v => count.checked_sub(v.unsigned_abs() as usize),
    };
    match resolved {
        Some(i) if i < count => Ok(Some(i)),
        _ => Err(parse_error(
            line,
            format!("{what} index {value} out of range (have {count})"),
        )),
    }
}

fn parse_corner(line: usize, token: &str, counts: [usize; 3]) -> Result<Corner> {
    let mut fields = token.split('/');
    let position = resolve_index(line, fields.next().unwrap_or(""), counts[0], "position")?
        .ok_or_else(|| parse_error(line, format!("face corner {token:?} has no position")))?;
    let uv = resolve_index(line, fields.next().unwrap_or(""), counts[1], "texture coordinate")?;
    let normal = resolve_index(line, fields.next().unwrap_or(""), counts[2], "normal")?;
    Ok(Corner {
        position,
        uv,
        normal,
    })
}

/// Parses OBJ text into a new mesh.
///
/// When the file carries no normals they are computed with
/// [`StaticMesh::smooth_normals`].
pub fn parse_obj(source: &str) -> Result<StaticMesh> {
    let mut mesh = StaticMesh::new();
    let mut uvs: Vec<Vec2> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();

    for (number, raw_line) in source.lines().enumerate() {
        let line = number + 1;
        let content = raw_line.split('#').next().unwrap_or("").trim();
        let mut parts = content.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };
        let args: Vec<&str> = parts.collect();

        match keyword {
            "v" => {
                let [x, y, z] = parse_floats::<3>(line, &args)?;
                mesh.add_vertex(Vec3::new(x, y, z), Vec2::ZERO, Vec3::X);
            }
            "vt" => {
                let [u, v] = parse_floats::<2>(line, &args)?;
                uvs.push(Vec2::new(u, v));
            }
            "vn" => {
                let [x, y, z] = parse_floats::<3>(line, &args)?;
                normals.push(Vec3::new(x, y, z));
            }
            "f" => {
                if args.len() != 3 && args.len() != 4 {
                    return Err(parse_error(
                        line,
                        format!("faces need 3 or 4 corners, found {}", args.len()),
                    ));
                }
                let counts = [mesh.vertex_count(), uvs.len(), normals.len()];
                let corners = args
                    .iter()
                    .map(|token| parse_corner(line, token, counts))
                    .collect::<Result<Vec<_>>>()?;

                for corner in &corners {
                    let vertex = &mut mesh.vertices_mut()[corner.position];
                    if let Some(uv) = corner.uv {
                        vertex.uv = uvs[uv];
                    }
                    if let Some(normal) = corner.normal {
                        vertex.set_normal(normals[normal]);
                    }
                }

                let index = |i: usize| corners[i].position as u32;
                mesh.add_triangle(index(0), index(1), index(2));
                if corners.len() == 4 {
                    mesh.add_triangle(index(0), index(2), index(3));
                }
            }
            _ => log::trace!("Ignoring OBJ statement {keyword:?} at line {line}"),
        }
    }

    if normals.is_empty() && mesh.triangle_count() > 0 {
        mesh.smooth_normals();
    }

    Ok(mesh)
}

/// Serializes the mesh geometry as OBJ text, one `v`/`vt`/`vn` per vertex.
#[must_use]
pub fn write_obj(mesh: &StaticMesh) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "# {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    for v in mesh.vertices() {
        let _ = writeln!(out, "v {} {} {}", v.position.x, v.position.y, v.position.z);
    }
    for v in mesh.vertices() {
        let _ = writeln!(out, "vt {} {}", v.uv.x, v.uv.y);
    }
    for v in mesh.vertices() {
        let _ = writeln!(out, "vn {} {} {}", v.normal.x, v.normal.y, v.normal.z);
    }
    for t in mesh.triangles() {
        let [a, b, c] = t.indices.map(|i| i + 1);
        let _ = writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}");
    }
    out
}

impl StaticMesh {
    /// Loads a mesh from an OBJ file.
    pub fn load_obj(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let mesh = parse_obj(&source)?;
        log::debug!(
            "Loaded {} ({} vertices, {} triangles)",
            path.display(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    /// Saves the mesh geometry to an OBJ file.
    pub fn save_obj(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, write_obj(self))?;
        Ok(())
    }
}
