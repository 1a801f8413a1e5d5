//! Wavefront OBJ loading
//!
//! Reads `v`, `vt`, `vn` and `f` statements; everything else is skipped.
//! Each face becomes one `Primitive`.

use std::fs;
use std::path::Path;
use crate::rasterizer::{Color, GeometryError, Mesh, Primitive, Vec2, Vec3};

/// Error type for model loading
#[derive(Debug)]
pub enum ObjError {
    IoError(std::io::Error),
    InvalidNumber { line: usize, token: String },
    InvalidIndex { line: usize, token: String },
    MissingValues { line: usize, expected: usize, found: usize },
    IndexOutOfRange { line: usize, kind: &'static str, index: usize, len: usize },
    Geometry { line: usize, source: GeometryError },
}

impl From<std::io::Error> for ObjError {
    fn from(e: std::io::Error) -> Self {
        ObjError::IoError(e)
    }
}

impl std::fmt::Display for ObjError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjError::IoError(e) => write!(f, "IO error: {}", e),
            ObjError::InvalidNumber { line, token } => {
                write!(f, "line {}: invalid number '{}'", line, token)
            }
            ObjError::InvalidIndex { line, token } => {
                write!(f, "line {}: invalid face index '{}'", line, token)
            }
            ObjError::MissingValues { line, expected, found } => {
                write!(f, "line {}: expected {} values, found {}", line, expected, found)
            }
            ObjError::IndexOutOfRange { line, kind, index, len } => {
                write!(f, "line {}: {} index {} out of range ({} defined)", line, kind, index + 1, len)
            }
            ObjError::Geometry { line, source } => write!(f, "line {}: {}", line, source),
        }
    }
}

impl std::error::Error for ObjError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ObjError::IoError(e) => Some(e),
            ObjError::Geometry { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// One `v/vt/vn` slot of a face, 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceCorner {
    pub vertex: usize,
    pub texcoord: Option<usize>,
    pub normal: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjFace {
    /// Source line, 1-based, for error reporting
    pub line: usize,
    pub corners: Vec<FaceCorner>,
}

/// Raw statement data before mesh assembly
#[derive(Debug, Clone, Default)]
pub struct ParsedObj {
    pub vertices: Vec<Vec3>,
    pub texcoords: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub faces: Vec<ObjFace>,
}

pub struct ObjParser;

impl ObjParser {
    pub fn parse(source: &str) -> Result<ParsedObj, ObjError> {
        let mut parsed = ParsedObj::default();

        for (i, raw) in source.lines().enumerate() {
            let line = i + 1;
            let content = raw.split('#').next().unwrap_or("").trim();
            let mut tokens = content.split_whitespace();
            let Some(head) = tokens.next() else {
                continue;
            };
            let data: Vec<&str> = tokens.collect();

            match head {
                "v" => {
                    let [x, y, z] = parse_floats::<3>(line, &data)?;
                    parsed.vertices.push(Vec3::new(x, y, z));
                }
                "vt" => {
                    // v is optional and defaults to 0
                    let [u] = parse_floats::<1>(line, &data)?;
                    let v = match data.get(1) {
                        Some(_) => parse_floats::<2>(line, &data)?[1],
                        None => 0.0,
                    };
                    parsed.texcoords.push(Vec2::new(u, v));
                }
                "vn" => {
                    let [x, y, z] = parse_floats::<3>(line, &data)?;
                    parsed.normals.push(Vec3::new(x, y, z));
                }
                "f" => {
                    let corners = data
                        .iter()
                        .map(|token| parse_corner(line, token, &parsed))
                        .collect::<Result<Vec<_>, _>>()?;
                    parsed.faces.push(ObjFace { line, corners });
                }
                _ => {}
            }
        }

        Ok(parsed)
    }
}

/// Leading `N` numbers; extra values (e.g. a `w` component) are ignored
fn parse_floats<const N: usize>(line: usize, data: &[&str]) -> Result<[f32; N], ObjError> {
    if data.len() < N {
        return Err(ObjError::MissingValues { line, expected: N, found: data.len() });
    }
    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(data) {
        *slot = token
            .parse()
            .map_err(|_| ObjError::InvalidNumber { line, token: token.to_string() })?;
    }
    Ok(out)
}

fn parse_corner(line: usize, token: &str, parsed: &ParsedObj) -> Result<FaceCorner, ObjError> {
    let mut slots = token.split('/');
    let mut next = |len: usize| -> Result<Option<usize>, ObjError> {
        match slots.next() {
            None | Some("") => Ok(None),
            Some(s) => resolve_index(s, len)
                .map(Some)
                .ok_or_else(|| ObjError::InvalidIndex { line, token: token.to_string() }),
        }
    };

    let vertex = next(parsed.vertices.len())?
        .ok_or_else(|| ObjError::InvalidIndex { line, token: token.to_string() })?;
    let texcoord = next(parsed.texcoords.len())?;
    let normal = next(parsed.normals.len())?;
    Ok(FaceCorner { vertex, texcoord, normal })
}

/// 1-based index to 0-based; negative indices count back from the end of
/// what has been read so far
fn resolve_index(s: &str, len: usize) -> Option<usize> {
    let i: i64 = s.parse().ok()?;
    if i > 0 {
        Some(i as usize - 1)
    } else if i < 0 {
        let back = i.unsigned_abs() as usize;
        len.checked_sub(back)
    } else {
        None
    }
}

impl ParsedObj {
    /// Build one primitive per face. A face uses its file normals only if
    /// every corner names one; otherwise the primitive derives a flat normal.
    pub fn into_mesh(self, color: Color) -> Result<Mesh, ObjError> {
        let mut primitives = Vec::with_capacity(self.faces.len());
        let mut positions = Vec::new();
        let mut normals = Vec::new();

        for face in &self.faces {
            let line = face.line;
            positions.clear();
            normals.clear();

            for corner in &face.corners {
                positions.push(lookup(&self.vertices, corner.vertex, "vertex", line)?);
                if let Some(t) = corner.texcoord {
                    lookup(&self.texcoords, t, "texcoord", line)?;
                }
                if let Some(n) = corner.normal {
                    normals.push(lookup(&self.normals, n, "normal", line)?);
                }
            }

            let supplied = (!normals.is_empty() && normals.len() == positions.len()).then_some(&normals[..]);
            if supplied.is_none() && !normals.is_empty() {
                log::debug!("line {}: partial normals, generating a face normal", line);
            }
            let prim = Primitive::new(&positions, supplied)
                .map_err(|source| ObjError::Geometry { line, source })?;
            primitives.push(prim);
        }

        Ok(Mesh::new(primitives, color))
    }
}

fn lookup<T: Copy>(items: &[T], index: usize, kind: &'static str, line: usize) -> Result<T, ObjError> {
    items
        .get(index)
        .copied()
        .ok_or(ObjError::IndexOutOfRange { line, kind, index, len: items.len() })
}

/// Load a mesh from an OBJ file
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh, ObjError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let mesh = load_obj_from_str(&contents)?;
    log::info!("loaded {} ({} primitives)", path.display(), mesh.primitives().len());
    Ok(mesh)
}

/// Load a mesh from OBJ source text (for embedded models or testing)
pub fn load_obj_from_str(s: &str) -> Result<Mesh, ObjError> {
    ObjParser::parse(s)?.into_mesh(Color::WHITE)
}
