//! # anyform - Universal File-Format Ingestion
//!
//! `anyform` takes an in-memory file (bytes plus a name and an optional MIME
//! type), classifies it into a data modality, decodes it with the matching
//! format decoder, and hands back one canonical [`StandardEnvelope`]. The
//! envelope is the only contract downstream code needs: rendering and
//! charting layers consume its payload shapes and never see byte offsets,
//! header fields, or per-format quirks.
//!
//! ## Supported Formats
//!
//! | Modality | Formats | Payload shape |
//! |----------|---------|---------------|
//! | Biosignal | EDF, BDF | [`ChannelSet`](envelope::ChannelSet) |
//! | Volumetric image | NIfTI-1 | [`VolumeGrid`](envelope::VolumeGrid) |
//! | Mesh | OBJ, STL (ASCII + binary), PLY (ASCII) | [`MeshGeometry`](envelope::MeshGeometry) |
//! | Point cloud | XYZ/PTS/ASC, PCD (ASCII) | [`PointCloud`](envelope::PointCloud) |
//! | Tabular | CSV/TSV, JSON | [`TabularSeries`](envelope::TabularSeries) |
//! | Raster | PNG, JPEG, GIF, BMP, WebP, TIFF | [`RasterImage`](envelope::RasterImage) |
//! | Audio, unknown | any | raw bytes, passed through |
//!
//! Audio containers and unrecognized files never fail: their bytes pass
//! through as [`Payload::Opaque`](envelope::Payload::Opaque) so a caller can
//! still present the file generically or hand it to a platform decoder.
//!
//! ## Quick Start
//!
//! ```rust
//! use anyform::prelude::*;
//!
//! let source = SourceFile::new(
//!     "signals.csv",
//!     "text/csv",
//!     b"time,value\n0,1.5\n1,2.5\n".to_vec(),
//! );
//! let envelope = anyform::decode(&source)?;
//!
//! assert_eq!(envelope.classification.modality, Modality::TabularSeries);
//! assert_eq!(envelope.metadata.format, "CSV");
//! assert_eq!(suggested_view(envelope.classification.modality), ViewMode::Chart);
//! # Ok::<(), anyform::error::DecodeError>(())
//! ```
//!
//! ## Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`source`]: the immutable input handle for one decode call
//! - [`classify`]: extension table and MIME fallback, name to modality
//! - [`formats`]: one decoder per format family, plus the total dispatcher
//! - [`envelope`]: canonical payload shapes and the standard envelope
//! - [`binread`]: bounds-checked fixed-offset header reads
//! - [`text`]: lossy text decoding, tokenizing, numeric coercion
//! - [`error`]: the shared decode error taxonomy
//!
//! ## Error Policy
//!
//! Binary fixed-layout formats (EDF, NIfTI, binary STL) decode strictly:
//! a truncated or inconsistent header is a hard [`error::DecodeError`].
//! Line-oriented text formats (CSV, XYZ, PCD) decode leniently: malformed
//! rows are skipped with a log warning and the partial result is returned.

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod binread;
pub mod classify;
pub mod envelope;
pub mod error;
pub mod formats;
pub mod source;
pub mod text;

use crate::envelope::{Metadata, StandardEnvelope};
use crate::error::DecodeError;
use crate::source::SourceFile;

/// Classify and decode one source file into a standard envelope.
///
/// This is the crate's single entry point. It is a pure function of the
/// source file: no state is shared between calls, and decoding the same
/// buffer twice yields structurally equal envelopes.
pub fn decode(source: &SourceFile) -> Result<StandardEnvelope, DecodeError> {
    let classification = classify::classify(&source.name, &source.mime);
    let mut metadata = Metadata::new(&source.name, source.bytes.len(), classification);
    let payload = formats::decode_classified(source, classification.format, &mut metadata)?;
    Ok(StandardEnvelope {
        classification,
        payload,
        metadata,
    })
}

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::classify::{classify, Classification, ConcreteFormat, Modality};
    pub use crate::decode;
    pub use crate::envelope::{
        suggested_view, Channel, ChannelSet, Column, ColumnValues, FaceVertex, MeshGeometry,
        Metadata, Payload, PointCloud, RasterImage, StandardEnvelope, TabularSeries, ViewMode,
        VolumeGrid,
    };
    pub use crate::error::DecodeError;
    pub use crate::source::SourceFile;
}
