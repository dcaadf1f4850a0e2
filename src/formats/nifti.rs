//! NIfTI-1 volumetric decoder.
//!
//! Fixed 348-byte little-endian header. The `sizeof_hdr` field doubles as
//! the format check: anything other than 348 (including byte-swapped
//! big-endian files) is an unsupported variant. Scalar voxel payloads
//! (u8/i16/i32/f32/f64) are decoded into the flat f32 grid; 4-D headers
//! are accepted for metadata but only the first volume is decoded.

use byteorder::LittleEndian;
use log::debug;

use crate::binread::HeaderReader;
use crate::envelope::{Metadata, VolumeGrid};
use crate::error::DecodeError;

/// Fixed NIfTI-1 header length and the value `sizeof_hdr` must hold.
const HEADER_LEN: usize = 348;

// Datatype codes from the NIfTI-1 standard.
const DT_UINT8: i16 = 2;
const DT_INT16: i16 = 4;
const DT_INT32: i16 = 8;
const DT_FLOAT32: i16 = 16;
const DT_FLOAT64: i16 = 64;

/// Decode a NIfTI-1 buffer into a volume grid.
pub fn decode(bytes: &[u8], meta: &mut Metadata) -> Result<VolumeGrid, DecodeError> {
    // A .nii.gz body lands here when the caller did not decompress it;
    // compression codecs are out of scope, so say why instead of failing
    // the sizeof_hdr check with a confusing message.
    if bytes.len() >= 2 && bytes[0] == 0x1F && bytes[1] == 0x8B {
        return Err(DecodeError::UnsupportedVariant(
            "gzip-compressed NIfTI; decompress before decoding".into(),
        ));
    }

    if bytes.len() < HEADER_LEN {
        return Err(DecodeError::truncated(HEADER_LEN, bytes.len()));
    }
    let reader = HeaderReader::new(bytes);

    let sizeof_hdr = reader.i32_at::<LittleEndian>(0)?;
    if sizeof_hdr != HEADER_LEN as i32 {
        return Err(DecodeError::UnsupportedVariant(format!(
            "NIfTI sizeof_hdr is {sizeof_hdr}, expected 348"
        )));
    }

    let mut dim = [0i16; 8];
    let mut pixdim = [0f32; 8];
    for i in 0..8 {
        dim[i] = reader.i16_at::<LittleEndian>(40 + i * 2)?;
        pixdim[i] = reader.f32_at::<LittleEndian>(76 + i * 4)?;
    }
    let datatype = reader.i16_at::<LittleEndian>(70)?;
    let bitpix = reader.i16_at::<LittleEndian>(72)?;
    let vox_offset = reader.f32_at::<LittleEndian>(108)?;
    let scl_slope = reader.f32_at::<LittleEndian>(112)?;
    let scl_inter = reader.f32_at::<LittleEndian>(116)?;

    let used_dims = dim[0];
    if !(1..=7).contains(&used_dims) {
        return Err(DecodeError::malformed(format!(
            "NIfTI dim[0] is {used_dims}, expected 1..=7"
        )));
    }

    // Spatial dims are elements 1..=3; unused axes read as 0 or 1.
    let dims = [
        dim[1].max(1) as u32,
        dim[2].max(1) as u32,
        dim[3].max(1) as u32,
    ];
    let voxel_size = [
        non_degenerate(pixdim[1]),
        non_degenerate(pixdim[2]),
        non_degenerate(pixdim[3]),
    ];

    // scl_slope of 0 means "no rescale" in the standard, not "multiply by 0".
    let scale = if scl_slope == 0.0 { 1.0 } else { scl_slope };
    let intercept = scl_inter;

    let offset = vox_offset.max(0.0) as usize;
    let offset = offset.max(HEADER_LEN);
    let data = decode_voxels(&reader, offset, dims, datatype)?;

    meta.volume_dims = Some(dims);
    meta.voxel_size = Some(voxel_size);
    meta.datatype_code = Some(datatype);

    debug!(
        "NIfTI decode: dims {dims:?}, datatype {datatype} ({bitpix} bpp), {} voxels",
        data.len()
    );

    Ok(VolumeGrid {
        dims,
        voxel_size,
        data,
        scale,
        intercept,
    })
}

fn non_degenerate(size: f32) -> f32 {
    if size.is_finite() && size > 0.0 {
        size
    } else {
        1.0
    }
}

/// Decode the scalar voxel payload at `offset` into f32 values.
///
/// Only the first 3-D volume is decoded (4-D decode is a non-goal); a
/// payload shorter than the dims imply is `TruncatedInput`, never padded.
fn decode_voxels(
    reader: &HeaderReader<'_>,
    offset: usize,
    dims: [u32; 3],
    datatype: i16,
) -> Result<Vec<f32>, DecodeError> {
    let nvox = dims.iter().map(|&d| d as usize).product::<usize>();
    let width = match datatype {
        DT_UINT8 => 1,
        DT_INT16 => 2,
        DT_INT32 | DT_FLOAT32 => 4,
        DT_FLOAT64 => 8,
        other => {
            return Err(DecodeError::UnsupportedVariant(format!(
                "NIfTI datatype code {other}"
            )))
        }
    };

    let needed = offset + nvox * width;
    if needed > reader.len() {
        return Err(DecodeError::truncated(needed, reader.len()));
    }

    let mut data = Vec::with_capacity(nvox);
    for i in 0..nvox {
        let at = offset + i * width;
        let value = match datatype {
            DT_UINT8 => reader.u8_at(at)? as f32,
            DT_INT16 => reader.i16_at::<LittleEndian>(at)? as f32,
            DT_INT32 => reader.i32_at::<LittleEndian>(at)? as f32,
            DT_FLOAT32 => reader.f32_at::<LittleEndian>(at)?,
            DT_FLOAT64 => reader.f64_at::<LittleEndian>(at)? as f32,
            _ => unreachable!("datatype validated above"),
        };
        data.push(value);
    }
    Ok(data)
}
