//! Canonical payload shapes and the standard envelope.
//!
//! Every decoder converges to one of these shapes. The envelope is the
//! thin waist of the system: downstream consumers (rendering, charting)
//! depend only on it and its documented invariants, never on byte offsets
//! or source-format quirks.
//!
//! Invariants:
//! - `ChannelSet`: every channel has equal sample length.
//! - `VolumeGrid`: `data.len() == dims[0]*dims[1]*dims[2]`, addressed as
//!   `x + y*dimX + z*dimX*dimY`.
//! - `MeshGeometry`: all indices 0-based and in range; face arity >= 3.
//! - `PointCloud`: color/intensity lists are empty or point-list length.

use serde::{Deserialize, Serialize};

use crate::classify::{Classification, Modality};
use crate::error::DecodeError;

/// One named channel of 32-bit float samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel label, e.g. an EEG electrode name or a CSV column name.
    pub label: String,
    /// Sample values.
    pub samples: Vec<f32>,
}

/// Ordered set of equal-length channels with timing information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelSet {
    /// Channels in source order. All have identical sample counts.
    pub channels: Vec<Channel>,
    /// Samples per second, when the source declares one.
    pub sample_rate_hz: Option<f64>,
    /// Total duration in seconds, when the source declares one.
    pub duration_secs: Option<f64>,
}

impl ChannelSet {
    /// Truncate all channels to the shortest channel's length.
    ///
    /// Ragged rows from malformed CSV input are clipped, never an error.
    pub fn truncate_to_shortest(&mut self) {
        let min = self
            .channels
            .iter()
            .map(|c| c.samples.len())
            .min()
            .unwrap_or(0);
        for channel in &mut self.channels {
            channel.samples.truncate(min);
        }
    }

    /// Sample count shared by every channel.
    pub fn samples_per_channel(&self) -> usize {
        self.channels.first().map_or(0, |c| c.samples.len())
    }
}

/// A 3D voxel grid with linear intensity rescale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeGrid {
    /// Spatial dimensions (x, y, z).
    pub dims: [u32; 3],
    /// Physical voxel extent per axis.
    pub voxel_size: [f32; 3],
    /// Flat voxel buffer, `x + y*dimX + z*dimX*dimY` addressing.
    pub data: Vec<f32>,
    /// Intensity slope: `physical = raw * scale + intercept`.
    pub scale: f32,
    /// Intensity intercept.
    pub intercept: f32,
}

impl VolumeGrid {
    /// Voxel count implied by the dimensions.
    pub fn voxel_count(&self) -> usize {
        self.dims.iter().map(|&d| d as usize).product()
    }

    /// Raw value at (x, y, z). `None` when out of range.
    pub fn voxel(&self, x: u32, y: u32, z: u32) -> Option<f32> {
        if x >= self.dims[0] || y >= self.dims[1] || z >= self.dims[2] {
            return None;
        }
        let index = x as usize
            + y as usize * self.dims[0] as usize
            + z as usize * self.dims[0] as usize * self.dims[1] as usize;
        self.data.get(index).copied()
    }
}

/// One corner of a mesh face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceVertex {
    /// 0-based index into the position list.
    pub position: u32,
    /// 0-based index into the normal list, when the source provides one.
    pub normal: Option<u32>,
    /// 0-based index into the texcoord list, when the source provides one.
    pub texcoord: Option<u32>,
}

impl FaceVertex {
    /// A face vertex referencing only a position.
    pub fn position_only(position: u32) -> Self {
        Self {
            position,
            normal: None,
            texcoord: None,
        }
    }
}

/// Indexed surface geometry with polygon faces preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshGeometry {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Per-vertex normals; empty, or the same length as `positions` for
    /// triangle-soup formats (STL) where vertex i pairs with normal i.
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates referenced by face texcoord indices.
    pub texcoords: Vec<[f32; 2]>,
    /// Faces in source order; arity >= 3, polygons not pre-triangulated.
    pub faces: Vec<Vec<FaceVertex>>,
}

impl MeshGeometry {
    /// Check the index invariant: every face has arity >= 3 and every
    /// index lands inside its target list.
    pub fn validate(&self) -> Result<(), DecodeError> {
        for (i, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(DecodeError::InvalidGeometry(format!(
                    "face {i} has {} vertices, need at least 3",
                    face.len()
                )));
            }
            for fv in face {
                if fv.position as usize >= self.positions.len() {
                    return Err(DecodeError::InvalidGeometry(format!(
                        "face {i} references vertex {} of {}",
                        fv.position,
                        self.positions.len()
                    )));
                }
                if let Some(n) = fv.normal {
                    if n as usize >= self.normals.len() {
                        return Err(DecodeError::InvalidGeometry(format!(
                            "face {i} references normal {} of {}",
                            n,
                            self.normals.len()
                        )));
                    }
                }
                if let Some(t) = fv.texcoord {
                    if t as usize >= self.texcoords.len() {
                        return Err(DecodeError::InvalidGeometry(format!(
                            "face {i} references texcoord {} of {}",
                            t,
                            self.texcoords.len()
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Fan-triangulate every polygon face into a flat position-index list
    /// (triangle i, corners 0, i, i+1). Consumers that need triangles call
    /// this; the decoder itself preserves arity.
    pub fn triangulated_indices(&self) -> Vec<u32> {
        let mut out = Vec::new();
        for face in &self.faces {
            for i in 1..face.len().saturating_sub(1) {
                out.push(face[0].position);
                out.push(face[i].position);
                out.push(face[i + 1].position);
            }
        }
        out
    }

    /// Total triangle count after fan triangulation.
    pub fn triangle_count(&self) -> usize {
        self.faces.iter().map(|f| f.len().saturating_sub(2)).sum()
    }
}

/// Unstructured points with optional parallel color/intensity lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    /// Point positions.
    pub points: Vec<[f32; 3]>,
    /// RGB colors in 0..=1; empty or `points.len()`.
    pub colors: Vec<[f32; 3]>,
    /// Scalar per point (e.g. intensity); empty or `points.len()`.
    pub intensities: Vec<f32>,
}

impl PointCloud {
    /// Check the parallel-array invariant.
    pub fn validate(&self) -> Result<(), DecodeError> {
        if !self.colors.is_empty() && self.colors.len() != self.points.len() {
            return Err(DecodeError::InvalidGeometry(format!(
                "color list length {} does not match point count {}",
                self.colors.len(),
                self.points.len()
            )));
        }
        if !self.intensities.is_empty() && self.intensities.len() != self.points.len() {
            return Err(DecodeError::InvalidGeometry(format!(
                "intensity list length {} does not match point count {}",
                self.intensities.len(),
                self.points.len()
            )));
        }
        Ok(())
    }
}

/// Values of one tabular column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnValues {
    /// Every cell coerced to a number.
    Numeric(Vec<f64>),
    /// At least one cell resisted numeric coercion; raw strings kept.
    Text(Vec<String>),
}

impl ColumnValues {
    /// Row count of the column.
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    /// True when the column holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One named, typed tabular column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Header name, or a synthetic `Ch{n}` when the source has no header.
    pub name: String,
    /// Row-aligned values.
    pub values: ColumnValues,
}

/// Row-aligned named columns, or a raw JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TabularSeries {
    /// Parsed columns from CSV/TSV or a homogeneous JSON array.
    Columns(Vec<Column>),
    /// JSON passed through unmodified; the visualization layer adapts to
    /// its shape (permissive by design).
    Json(serde_json::Value),
}

/// Decoded raster image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed RGBA8 pixels, row-major.
    pub rgba: Vec<u8>,
}

/// The canonical payload a decoder emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// Multi-channel signal.
    Channels(ChannelSet),
    /// 3D voxel grid.
    Volume(VolumeGrid),
    /// Surface mesh.
    Mesh(MeshGeometry),
    /// Point cloud.
    Points(PointCloud),
    /// Tabular data.
    Table(TabularSeries),
    /// Decoded raster image.
    Raster(RasterImage),
    /// Raw bytes: unrecognized files and audio containers (audio sample
    /// decoding is delegated to a platform decoder outside this crate).
    Opaque(Vec<u8>),
}

/// Free-form descriptive record accompanying every payload.
///
/// Only the fields relevant to the decoded format are populated; the rest
/// stay `None` and are skipped on serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Source file name.
    pub filename: String,
    /// Source byte length.
    pub byte_size: usize,
    /// Detected modality tag.
    pub modality: String,
    /// Detected concrete format tag. For STL this is the resolved variant
    /// ("STL-ASCII" or "STL-Binary"), which only decode can determine.
    pub format: String,
    /// Samples per second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate_hz: Option<f64>,
    /// Channel count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_count: Option<usize>,
    /// Recording duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    /// Recording start timestamp, ISO 8601, when the header declares one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// Volume dimensions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_dims: Option<[u32; 3]>,
    /// Voxel size per axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voxel_size: Option<[f32; 3]>,
    /// Source datatype code (NIfTI).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datatype_code: Option<i16>,
    /// Vertex count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertex_count: Option<usize>,
    /// Face count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_count: Option<usize>,
    /// Point count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_count: Option<usize>,
    /// Column names for tabular payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_names: Option<Vec<String>>,
    /// Row count for tabular payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
    /// Raster dimensions (width, height).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_dims: Option<(u32, u32)>,
}

impl Metadata {
    /// Start a metadata record from a classification and file identity.
    pub fn new(filename: &str, byte_size: usize, classification: Classification) -> Self {
        Self {
            filename: filename.to_string(),
            byte_size,
            modality: classification.modality.to_string(),
            format: classification.format.to_string(),
            ..Self::default()
        }
    }
}

/// The sole long-lived output of a decode call.
///
/// Created once and never mutated by the ingestion layer afterward;
/// ownership passes entirely to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardEnvelope {
    /// Resolved classification.
    pub classification: Classification,
    /// Canonical payload.
    pub payload: Payload,
    /// Descriptive metadata.
    pub metadata: Metadata,
}

/// Recommended visualization for a modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    /// Stacked per-channel signal traces.
    SignalTraces,
    /// Orthogonal slice viewer.
    SliceViewer,
    /// Shaded surface render.
    Surface,
    /// Point sprite render.
    Points,
    /// Line/scatter chart.
    Chart,
    /// 2D image view.
    Image,
    /// Waveform transport view.
    Waveform,
    /// Generic/unknown fallback view.
    Generic,
}

/// Map a modality to its recommended visualization.
///
/// Pure and total, with [`ViewMode::Generic`] as the explicit default, so
/// callers always receive some suggestion.
pub fn suggested_view(modality: Modality) -> ViewMode {
    match modality {
        Modality::BioSignal => ViewMode::SignalTraces,
        Modality::VolumetricImage => ViewMode::SliceViewer,
        Modality::Mesh => ViewMode::Surface,
        Modality::PointCloud => ViewMode::Points,
        Modality::TabularSeries => ViewMode::Chart,
        Modality::Raster => ViewMode::Image,
        Modality::Audio => ViewMode::Waveform,
        Modality::Opaque => ViewMode::Generic,
    }
}
