//! Modality classification from filename extension and MIME hint.
//!
//! The extension table is authoritative; MIME prefix matching is a fallback
//! only, and anything still unplaced classifies as [`Modality::Opaque`].
//! `classify` is pure and total: it always returns a classification and
//! never fails, so the UI layer never hard-fails on an unrecognized file.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse data modality of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modality {
    /// Audio container; sample decoding is delegated to a platform decoder.
    Audio,
    /// Multi-channel biosignal recording (EEG/EMG).
    BioSignal,
    /// 3D volumetric image (voxel grid).
    VolumetricImage,
    /// Surface mesh geometry.
    Mesh,
    /// Unstructured 3D point cloud.
    PointCloud,
    /// Row/column tabular data.
    TabularSeries,
    /// 2D raster image.
    Raster,
    /// Unrecognized; carried through as raw bytes.
    Opaque,
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Modality::Audio => "Audio",
            Modality::BioSignal => "BioSignal",
            Modality::VolumetricImage => "VolumetricImage",
            Modality::Mesh => "Mesh",
            Modality::PointCloud => "PointCloud",
            Modality::TabularSeries => "TabularSeries",
            Modality::Raster => "Raster",
            Modality::Opaque => "Opaque",
        };
        write!(f, "{name}")
    }
}

/// Concrete sub-format a decoder understands.
///
/// A closed enum rather than a string-keyed lookup: adding a format is a
/// compile-time-checked exhaustive-match update in the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConcreteFormat {
    /// European Data Format (16-bit biosignal samples).
    Edf,
    /// BioSemi Data Format (24-bit biosignal samples).
    Bdf,
    /// NIfTI-1 volumetric header/format.
    Nifti1,
    /// Wavefront OBJ mesh.
    Obj,
    /// Stereolithography, ASCII or binary; resolved at decode time.
    Stl,
    /// Polygon File Format, ASCII.
    PlyAscii,
    /// Point Cloud Data, ASCII.
    PcdAscii,
    /// Plain-text point list (xyz/pts/asc).
    Xyz,
    /// Comma- or tab-separated values.
    Csv,
    /// JSON document.
    Json,
    /// Audio container (payload stays opaque here).
    Audio,
    /// Raster image, delegated to the platform image decoder.
    Raster,
    /// Anything else.
    Opaque,
}

impl ConcreteFormat {
    /// The modality this format belongs to.
    pub fn modality(self) -> Modality {
        match self {
            ConcreteFormat::Edf | ConcreteFormat::Bdf => Modality::BioSignal,
            ConcreteFormat::Nifti1 => Modality::VolumetricImage,
            ConcreteFormat::Obj | ConcreteFormat::Stl | ConcreteFormat::PlyAscii => Modality::Mesh,
            ConcreteFormat::PcdAscii | ConcreteFormat::Xyz => Modality::PointCloud,
            ConcreteFormat::Csv | ConcreteFormat::Json => Modality::TabularSeries,
            ConcreteFormat::Audio => Modality::Audio,
            ConcreteFormat::Raster => Modality::Raster,
            ConcreteFormat::Opaque => Modality::Opaque,
        }
    }
}

impl fmt::Display for ConcreteFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ConcreteFormat::Edf => "EDF",
            ConcreteFormat::Bdf => "BDF",
            ConcreteFormat::Nifti1 => "NIfTI1",
            ConcreteFormat::Obj => "OBJ",
            ConcreteFormat::Stl => "STL",
            ConcreteFormat::PlyAscii => "PLY-ASCII",
            ConcreteFormat::PcdAscii => "PCD-ASCII",
            ConcreteFormat::Xyz => "XYZ",
            ConcreteFormat::Csv => "CSV",
            ConcreteFormat::Json => "JSON",
            ConcreteFormat::Audio => "Audio",
            ConcreteFormat::Raster => "Raster",
            ConcreteFormat::Opaque => "Opaque",
        };
        write!(f, "{tag}")
    }
}

/// One source file's resolved modality and concrete format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Coarse modality tag.
    pub modality: Modality,
    /// Concrete sub-format tag.
    pub format: ConcreteFormat,
}

/// Authoritative extension → format mapping, exposed for inspection.
///
/// Extensions are lower-case and without the leading dot; `nii.gz` is the
/// one two-part entry and is matched before single-extension splitting.
pub const EXTENSION_TABLE: &[(&str, ConcreteFormat)] = &[
    ("edf", ConcreteFormat::Edf),
    ("bdf", ConcreteFormat::Bdf),
    ("nii", ConcreteFormat::Nifti1),
    ("nii.gz", ConcreteFormat::Nifti1),
    ("obj", ConcreteFormat::Obj),
    ("stl", ConcreteFormat::Stl),
    ("ply", ConcreteFormat::PlyAscii),
    ("pcd", ConcreteFormat::PcdAscii),
    ("xyz", ConcreteFormat::Xyz),
    ("pts", ConcreteFormat::Xyz),
    ("asc", ConcreteFormat::Xyz),
    ("csv", ConcreteFormat::Csv),
    ("tsv", ConcreteFormat::Csv),
    ("txt", ConcreteFormat::Csv),
    ("json", ConcreteFormat::Json),
    ("wav", ConcreteFormat::Audio),
    ("mp3", ConcreteFormat::Audio),
    ("ogg", ConcreteFormat::Audio),
    ("flac", ConcreteFormat::Audio),
    ("m4a", ConcreteFormat::Audio),
    ("png", ConcreteFormat::Raster),
    ("jpg", ConcreteFormat::Raster),
    ("jpeg", ConcreteFormat::Raster),
    ("gif", ConcreteFormat::Raster),
    ("bmp", ConcreteFormat::Raster),
    ("webp", ConcreteFormat::Raster),
    ("tif", ConcreteFormat::Raster),
    ("tiff", ConcreteFormat::Raster),
];

/// Classify a file by name and declared MIME type.
///
/// Extension table first, MIME prefix second (`audio/*`, `image/*`),
/// [`Modality::Opaque`] last. Pure and total.
pub fn classify(name: &str, mime: &str) -> Classification {
    let lower = name.to_ascii_lowercase();

    if let Some(format) = lookup_extension(&lower) {
        return Classification {
            modality: format.modality(),
            format,
        };
    }

    let mime = mime.to_ascii_lowercase();
    let format = if mime.starts_with("audio/") {
        ConcreteFormat::Audio
    } else if mime.starts_with("image/") {
        ConcreteFormat::Raster
    } else {
        ConcreteFormat::Opaque
    };

    Classification {
        modality: format.modality(),
        format,
    }
}

fn lookup_extension(lower_name: &str) -> Option<ConcreteFormat> {
    // Two-part extensions before generic splitting.
    if lower_name.ends_with(".nii.gz") {
        return Some(ConcreteFormat::Nifti1);
    }
    let ext = lower_name.rsplit_once('.').map(|(_, ext)| ext)?;
    EXTENSION_TABLE
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, format)| *format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_entry_classifies_to_its_format() {
        for (ext, format) in EXTENSION_TABLE {
            let name = format!("file.{ext}");
            let c = classify(&name, "");
            assert_eq!(c.format, *format, "extension {ext}");
            assert_eq!(c.modality, format.modality(), "extension {ext}");
        }
    }

    #[test]
    fn nii_gz_is_a_two_part_extension() {
        let c = classify("brain.NII.GZ", "");
        assert_eq!(c.format, ConcreteFormat::Nifti1);
        assert_eq!(c.modality, Modality::VolumetricImage);
    }

    #[test]
    fn mime_is_fallback_only() {
        // Known extension beats a contradictory MIME.
        let c = classify("scan.edf", "audio/mpeg");
        assert_eq!(c.modality, Modality::BioSignal);

        // Unknown extension falls back to MIME prefix.
        let c = classify("track.weird", "audio/mpeg");
        assert_eq!(c.modality, Modality::Audio);

        let c = classify("photo.weird", "image/png");
        assert_eq!(c.modality, Modality::Raster);
    }

    #[test]
    fn unknown_everything_is_opaque() {
        let c = classify("mystery.bin", "");
        assert_eq!(c.modality, Modality::Opaque);
        assert_eq!(c.format, ConcreteFormat::Opaque);
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify("MESH.STL", "").format, ConcreteFormat::Stl);
    }
}
