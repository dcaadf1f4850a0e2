//! Wavefront OBJ mesh decoder.
//!
//! Line-oriented ASCII; the first token selects behavior (`v`, `vn`, `vt`,
//! `f`). Face groups are `vertex[/texcoord][/normal]` with 1-based indices
//! (negative indices count back from the current list end); both are
//! normalized to 0-based at decode time and bounds-checked afterward.
//! Polygon faces keep their arity; triangulation is the consumer's concern.

use log::warn;

use crate::envelope::{FaceVertex, MeshGeometry};
use crate::error::DecodeError;
use crate::text;

/// Decode OBJ text into mesh geometry.
///
/// A face with fewer than 3 vertex groups or an index outside the decoded
/// lists is [`DecodeError::InvalidGeometry`]. Unknown line keywords
/// (`g`, `usemtl`, comments) are skipped.
pub fn decode(bytes: &[u8]) -> Result<MeshGeometry, DecodeError> {
    let content = text::decode_text(bytes);
    let mut mesh = MeshGeometry::default();

    for (line_no, line) in text::non_empty_lines(&content).enumerate() {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => mesh.positions.push(parse_triple(tokens, line_no, "v")?),
            Some("vn") => mesh.normals.push(parse_triple(tokens, line_no, "vn")?),
            Some("vt") => {
                let uv = parse_pair(tokens, line_no)?;
                mesh.texcoords.push(uv);
            }
            Some("f") => {
                let face = parse_face(tokens, &mesh, line_no)?;
                mesh.faces.push(face);
            }
            Some("#") | None => {}
            Some(other) => {
                // Groups, materials, smoothing: irrelevant to geometry.
                log::trace!("obj line {line_no}: skipping keyword {other:?}");
            }
        }
    }

    mesh.validate()?;
    Ok(mesh)
}

fn parse_triple<'a>(
    mut tokens: impl Iterator<Item = &'a str>,
    line_no: usize,
    keyword: &str,
) -> Result<[f32; 3], DecodeError> {
    let mut out = [0f32; 3];
    for slot in &mut out {
        let token = tokens.next().ok_or_else(|| {
            DecodeError::InvalidGeometry(format!("obj line {line_no}: {keyword} needs 3 values"))
        })?;
        *slot = text::coerce_f64(token).ok_or_else(|| {
            DecodeError::InvalidGeometry(format!(
                "obj line {line_no}: {keyword} value {token:?} is not a number"
            ))
        })? as f32;
    }
    Ok(out)
}

fn parse_pair<'a>(
    mut tokens: impl Iterator<Item = &'a str>,
    line_no: usize,
) -> Result<[f32; 2], DecodeError> {
    let mut out = [0f32; 2];
    for slot in &mut out {
        let token = tokens.next().ok_or_else(|| {
            DecodeError::InvalidGeometry(format!("obj line {line_no}: vt needs 2 values"))
        })?;
        *slot = text::coerce_f64(token).ok_or_else(|| {
            DecodeError::InvalidGeometry(format!(
                "obj line {line_no}: vt value {token:?} is not a number"
            ))
        })? as f32;
    }
    Ok(out)
}

fn parse_face<'a>(
    tokens: impl Iterator<Item = &'a str>,
    mesh: &MeshGeometry,
    line_no: usize,
) -> Result<Vec<FaceVertex>, DecodeError> {
    let mut face = Vec::new();
    for group in tokens {
        let mut parts = group.split('/');
        let position = parts.next().unwrap_or("");
        let texcoord = parts.next().unwrap_or("");
        let normal = parts.next().unwrap_or("");

        let position = normalize_index(position, mesh.positions.len(), line_no)?.ok_or_else(
            || {
                DecodeError::InvalidGeometry(format!(
                    "obj line {line_no}: face group {group:?} has no vertex index"
                ))
            },
        )?;
        let texcoord = normalize_index(texcoord, mesh.texcoords.len(), line_no)?;
        let normal = normalize_index(normal, mesh.normals.len(), line_no)?;

        face.push(FaceVertex {
            position,
            normal,
            texcoord,
        });
    }

    if face.len() < 3 {
        return Err(DecodeError::InvalidGeometry(format!(
            "obj line {line_no}: face has {} vertex groups, need at least 3",
            face.len()
        )));
    }
    Ok(face)
}

/// Normalize a 1-based (or negative relative) OBJ index to 0-based.
///
/// Empty subgroups (the middle of `v//vn`) yield `None`. Upper bounds are
/// enforced by `MeshGeometry::validate` after the full decode; negative
/// indices resolve against the list length seen so far.
fn normalize_index(
    token: &str,
    current_len: usize,
    line_no: usize,
) -> Result<Option<u32>, DecodeError> {
    if token.is_empty() {
        return Ok(None);
    }
    let raw: i64 = token.parse().map_err(|_| {
        DecodeError::InvalidGeometry(format!(
            "obj line {line_no}: index {token:?} is not an integer"
        ))
    })?;
    let zero_based = if raw > 0 {
        raw - 1
    } else if raw < 0 {
        current_len as i64 + raw
    } else {
        -1 // OBJ indices are never 0
    };
    if zero_based < 0 {
        warn!("obj line {line_no}: index {raw} resolves before the start of the list");
        return Err(DecodeError::InvalidGeometry(format!(
            "obj line {line_no}: index {raw} out of range"
        )));
    }
    Ok(Some(zero_based as u32))
}
