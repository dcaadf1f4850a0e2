//! ASCII PLY mesh decoder.
//!
//! Header block up to a literal `end_header` line declares element counts;
//! `element vertex N` and `element face M` are consumed in declaration
//! order, vertices before faces. Vertex lines carry x, y, z as their first
//! three tokens; face lines are `count idx0 .. idx(count-1)`. Binary PLY
//! bodies are an unsupported variant.

use log::debug;

use crate::envelope::{FaceVertex, MeshGeometry};
use crate::error::DecodeError;
use crate::text;

/// Decode an ASCII PLY buffer into mesh geometry.
pub fn decode(bytes: &[u8]) -> Result<MeshGeometry, DecodeError> {
    let content = text::decode_text(bytes);
    let mut lines = text::non_empty_lines(&content);

    match lines.next() {
        Some("ply") => {}
        other => {
            return Err(DecodeError::malformed(format!(
                "ply: first line is {other:?}, expected \"ply\""
            )))
        }
    }

    // Header: format line, element declarations, properties we ignore.
    let mut vertex_count: Option<usize> = None;
    let mut face_count: Option<usize> = None;
    let mut saw_end_header = false;
    for line in lines.by_ref() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            ["end_header"] => {
                saw_end_header = true;
                break;
            }
            ["format", kind, ..] => {
                if !kind.eq_ignore_ascii_case("ascii") {
                    return Err(DecodeError::UnsupportedVariant(format!(
                        "binary PLY ({kind})"
                    )));
                }
            }
            ["element", "vertex", n] => {
                vertex_count = Some(parse_count(n, "element vertex")?);
            }
            ["element", "face", n] => {
                face_count = Some(parse_count(n, "element face")?);
            }
            // comment, property, other elements: no effect on decoding.
            _ => {}
        }
    }
    if !saw_end_header {
        return Err(DecodeError::malformed("ply: no end_header line"));
    }

    let vertex_count = vertex_count.unwrap_or(0);
    let face_count = face_count.unwrap_or(0);

    // Declared counts are untrusted; pre-size only up to what the buffer
    // could hold (a vertex line is at least "0 0 0\n", a face "3 0 1 2\n").
    let mut mesh = MeshGeometry {
        positions: Vec::with_capacity(vertex_count.min(content.len() / 6)),
        faces: Vec::with_capacity(face_count.min(content.len() / 8)),
        ..MeshGeometry::default()
    };

    // Vertex block first, then the face block, in declaration order.
    for _ in 0..vertex_count {
        let line = lines
            .next()
            .ok_or_else(|| truncated_block("vertex", vertex_count, mesh.positions.len()))?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 3 {
            return Err(DecodeError::InvalidGeometry(format!(
                "ply vertex line has {} tokens, need x y z: {line:?}",
                tokens.len()
            )));
        }
        let mut position = [0f32; 3];
        for (slot, token) in position.iter_mut().zip(&tokens[..3]) {
            *slot = text::coerce_f64(token).ok_or_else(|| {
                DecodeError::InvalidGeometry(format!(
                    "ply vertex value {token:?} is not a number"
                ))
            })? as f32;
        }
        mesh.positions.push(position);
    }

    for _ in 0..face_count {
        let line = lines
            .next()
            .ok_or_else(|| truncated_block("face", face_count, mesh.faces.len()))?;
        let mut tokens = line.split_whitespace();
        let arity: usize = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| {
                DecodeError::InvalidGeometry(format!("ply face line has no count: {line:?}"))
            })?;
        if arity < 3 {
            return Err(DecodeError::InvalidGeometry(format!(
                "ply face declares {arity} vertices, need at least 3"
            )));
        }
        let mut face = Vec::with_capacity(arity.min(line.len() / 2));
        for _ in 0..arity {
            let index: u32 = tokens.next().and_then(|t| t.parse().ok()).ok_or_else(|| {
                DecodeError::InvalidGeometry(format!(
                    "ply face line is short of its declared count: {line:?}"
                ))
            })?;
            face.push(FaceVertex::position_only(index));
        }
        mesh.faces.push(face);
    }

    mesh.validate()?;
    debug!(
        "PLY decode: {} vertices, {} faces",
        mesh.positions.len(),
        mesh.faces.len()
    );
    Ok(mesh)
}

fn parse_count(token: &str, field: &str) -> Result<usize, DecodeError> {
    token
        .parse()
        .map_err(|_| DecodeError::malformed(format!("ply: {field} count {token:?}")))
}

fn truncated_block(element: &str, declared: usize, present: usize) -> DecodeError {
    DecodeError::MalformedHeader(format!(
        "ply: {element} block declares {declared} elements, only {present} lines present"
    ))
}
