//! Per-format decoders and the dispatch from classification to decoder.
//!
//! One submodule per format family, each built on the header-reader and
//! tokenizer primitives:
//!
//! - [`edf`] - EDF/BDF biosignal recordings
//! - [`nifti`] - NIfTI-1 volumetric images
//! - [`obj`], [`stl`], [`ply`] - mesh geometry
//! - [`pointcloud`] - XYZ-family and PCD point clouds
//! - [`tabular`] - CSV/TSV and JSON
//! - [`raster`] - raster images, delegated to the platform image decoder
//!
//! The dispatcher is a total match over [`ConcreteFormat`]: adding a
//! format is a compile-time-checked update here, never a string lookup.
//! Decoder errors propagate unchanged; nothing is caught and ignored.

pub mod edf;
pub mod nifti;
pub mod obj;
pub mod ply;
pub mod pointcloud;
pub mod raster;
pub mod stl;
pub mod tabular;

use crate::classify::ConcreteFormat;
use crate::envelope::{Metadata, Payload, TabularSeries};
use crate::error::DecodeError;
use crate::source::SourceFile;

/// Run the decoder selected by the classification, filling format-specific
/// metadata as it goes.
///
/// The `Opaque` and `Audio` arms always succeed with the raw buffer: an
/// unrecognized file must never hard-fail the UI, and audio sample decode
/// is an external platform service.
pub fn decode_classified(
    source: &SourceFile,
    format: ConcreteFormat,
    meta: &mut Metadata,
) -> Result<Payload, DecodeError> {
    let bytes = &source.bytes;
    match format {
        ConcreteFormat::Edf => Ok(Payload::Channels(edf::decode(bytes, false, meta)?)),
        ConcreteFormat::Bdf => Ok(Payload::Channels(edf::decode(bytes, true, meta)?)),
        ConcreteFormat::Nifti1 => Ok(Payload::Volume(nifti::decode(bytes, meta)?)),
        ConcreteFormat::Obj => {
            let mesh = obj::decode(bytes)?;
            fill_mesh_meta(meta, &mesh);
            Ok(Payload::Mesh(mesh))
        }
        ConcreteFormat::Stl => {
            let (mesh, variant) = stl::decode(bytes)?;
            meta.format = variant.tag().to_string();
            fill_mesh_meta(meta, &mesh);
            Ok(Payload::Mesh(mesh))
        }
        ConcreteFormat::PlyAscii => {
            let mesh = ply::decode(bytes)?;
            fill_mesh_meta(meta, &mesh);
            Ok(Payload::Mesh(mesh))
        }
        ConcreteFormat::PcdAscii => {
            let cloud = pointcloud::decode_pcd(bytes)?;
            meta.point_count = Some(cloud.points.len());
            Ok(Payload::Points(cloud))
        }
        ConcreteFormat::Xyz => {
            let cloud = pointcloud::decode_xyz(bytes)?;
            meta.point_count = Some(cloud.points.len());
            Ok(Payload::Points(cloud))
        }
        ConcreteFormat::Csv => {
            let table = tabular::decode_csv(bytes)?;
            fill_table_meta(meta, &table);
            Ok(Payload::Table(table))
        }
        ConcreteFormat::Json => {
            let table = tabular::decode_json(bytes)?;
            fill_table_meta(meta, &table);
            Ok(Payload::Table(table))
        }
        ConcreteFormat::Raster => {
            let raster = raster::decode(bytes)?;
            meta.image_dims = Some((raster.width, raster.height));
            Ok(Payload::Raster(raster))
        }
        ConcreteFormat::Audio | ConcreteFormat::Opaque => Ok(Payload::Opaque(bytes.clone())),
    }
}

fn fill_mesh_meta(meta: &mut Metadata, mesh: &crate::envelope::MeshGeometry) {
    meta.vertex_count = Some(mesh.positions.len());
    meta.face_count = Some(mesh.faces.len());
}

fn fill_table_meta(meta: &mut Metadata, table: &TabularSeries) {
    if let TabularSeries::Columns(columns) = table {
        meta.column_names = Some(columns.iter().map(|c| c.name.clone()).collect());
        meta.row_count = columns.first().map(|c| c.values.len());
    }
}
