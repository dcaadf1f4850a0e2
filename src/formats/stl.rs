//! STL mesh decoder, ASCII and binary.
//!
//! The classic `solid` sniff misroutes binary files whose header bytes
//! happen to spell it. Dispatch therefore tries the binary layout first
//! and accepts it iff the declared triangle count is consistent with the
//! buffer length (`84 + 50*count == len`); only when that fails does the
//! `solid` token route to the ASCII parser.
//!
//! Both variants produce triangle soup: 3 vertices and 3 identical normals
//! per triangle, no deduplication.

use byteorder::LittleEndian;
use log::debug;

use crate::binread::HeaderReader;
use crate::envelope::{FaceVertex, MeshGeometry};
use crate::error::DecodeError;
use crate::text;

/// Which STL layout a buffer resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StlVariant {
    /// `solid ... facet normal ... endsolid` text layout.
    Ascii,
    /// 80-byte header, u32 LE triangle count, 50-byte packed triangles.
    Binary,
}

impl StlVariant {
    /// Resolved format tag for envelope metadata.
    pub fn tag(self) -> &'static str {
        match self {
            StlVariant::Ascii => "STL-ASCII",
            StlVariant::Binary => "STL-Binary",
        }
    }
}

/// Fixed binary preamble: 80-byte header plus the 4-byte triangle count.
const BINARY_PREAMBLE: usize = 84;
/// Packed size of one binary triangle (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

/// Decode an STL buffer, resolving the ASCII/binary ambiguity first.
pub fn decode(bytes: &[u8]) -> Result<(MeshGeometry, StlVariant), DecodeError> {
    if binary_length_consistent(bytes) {
        return Ok((decode_binary(bytes)?, StlVariant::Binary));
    }
    if starts_with_solid(bytes) {
        return Ok((decode_ascii(bytes)?, StlVariant::Ascii));
    }
    // Neither layout fits: report against the binary contract, which is
    // the stricter and more informative of the two.
    decode_binary(bytes).map(|mesh| (mesh, StlVariant::Binary))
}

/// True when the first 5 non-whitespace bytes case-insensitively spell
/// `solid`.
pub fn starts_with_solid(bytes: &[u8]) -> bool {
    let trimmed: Vec<u8> = bytes
        .iter()
        .copied()
        .skip_while(|b| b.is_ascii_whitespace())
        .take(5)
        .collect();
    trimmed.eq_ignore_ascii_case(b"solid")
}

/// True when the declared binary triangle count exactly matches the
/// buffer length, the disambiguation check from the format's known
/// ASCII/binary ambiguity.
fn binary_length_consistent(bytes: &[u8]) -> bool {
    if bytes.len() < BINARY_PREAMBLE {
        return false;
    }
    let reader = HeaderReader::new(bytes);
    match reader.u32_at::<LittleEndian>(80) {
        Ok(count) => {
            let expected = BINARY_PREAMBLE as u64 + TRIANGLE_SIZE as u64 * count as u64;
            expected == bytes.len() as u64
        }
        Err(_) => false,
    }
}

/// Decode the fixed binary layout strictly and sequentially.
fn decode_binary(bytes: &[u8]) -> Result<MeshGeometry, DecodeError> {
    if bytes.len() < BINARY_PREAMBLE {
        return Err(DecodeError::truncated(BINARY_PREAMBLE, bytes.len()));
    }
    let reader = HeaderReader::new(bytes);
    let count = reader.u32_at::<LittleEndian>(80)? as usize;

    let needed = BINARY_PREAMBLE + count * TRIANGLE_SIZE;
    if bytes.len() < needed {
        return Err(DecodeError::truncated(needed, bytes.len()));
    }

    let mut mesh = MeshGeometry {
        positions: Vec::with_capacity(count * 3),
        normals: Vec::with_capacity(count * 3),
        texcoords: Vec::new(),
        faces: Vec::with_capacity(count),
    };

    for t in 0..count {
        let base = BINARY_PREAMBLE + t * TRIANGLE_SIZE;
        let normal = read_vec3(&reader, base)?;
        let mut face = Vec::with_capacity(3);
        for v in 0..3 {
            let position = read_vec3(&reader, base + 12 + v * 12)?;
            let index = mesh.positions.len() as u32;
            mesh.positions.push(position);
            mesh.normals.push(normal);
            face.push(FaceVertex {
                position: index,
                normal: Some(index),
                texcoord: None,
            });
        }
        // 2 attribute bytes per triangle are unused and skipped.
        mesh.faces.push(face);
    }

    debug!("binary STL: {count} triangles");
    Ok(mesh)
}

fn read_vec3(reader: &HeaderReader<'_>, offset: usize) -> Result<[f32; 3], DecodeError> {
    Ok([
        reader.f32_at::<LittleEndian>(offset)?,
        reader.f32_at::<LittleEndian>(offset + 4)?,
        reader.f32_at::<LittleEndian>(offset + 8)?,
    ])
}

/// Decode the ASCII layout: each `facet normal` sets the current normal
/// for the `vertex` lines that follow it.
fn decode_ascii(bytes: &[u8]) -> Result<MeshGeometry, DecodeError> {
    let content = text::decode_text(bytes);
    let mut mesh = MeshGeometry::default();
    let mut current_normal = [0f32; 3];
    let mut pending_face: Vec<FaceVertex> = Vec::new();

    for line in text::non_empty_lines(&content) {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some(word) if word.eq_ignore_ascii_case("facet") => {
                // "facet normal nx ny nz"
                let _ = tokens.next();
                current_normal = parse_vec3(&mut tokens).unwrap_or([0.0; 3]);
            }
            Some(word) if word.eq_ignore_ascii_case("vertex") => {
                let position = parse_vec3(&mut tokens).ok_or_else(|| {
                    DecodeError::InvalidGeometry(format!(
                        "stl vertex line is not three numbers: {line:?}"
                    ))
                })?;
                let index = mesh.positions.len() as u32;
                mesh.positions.push(position);
                mesh.normals.push(current_normal);
                pending_face.push(FaceVertex {
                    position: index,
                    normal: Some(index),
                    texcoord: None,
                });
            }
            Some(word) if word.eq_ignore_ascii_case("endfacet") => {
                if pending_face.len() != 3 {
                    return Err(DecodeError::InvalidGeometry(format!(
                        "stl facet closed with {} vertices, expected 3",
                        pending_face.len()
                    )));
                }
                mesh.faces.push(std::mem::take(&mut pending_face));
            }
            // solid/endsolid/outer/endloop carry no geometry.
            _ => {}
        }
    }

    if !pending_face.is_empty() {
        return Err(DecodeError::InvalidGeometry(format!(
            "stl ends inside a facet with {} vertices",
            pending_face.len()
        )));
    }

    debug!("ASCII STL: {} triangles", mesh.faces.len());
    Ok(mesh)
}

fn parse_vec3<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<[f32; 3]> {
    let mut out = [0f32; 3];
    for slot in &mut out {
        *slot = text::coerce_f64(tokens.next()?)? as f32;
    }
    Some(out)
}
