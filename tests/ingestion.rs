//! End-to-end ingestion tests.
//!
//! These exercise the full pipeline: classification from name/MIME, decode
//! dispatch, payload construction, and metadata fill, all through the
//! public `decode` entry point.

use anyform::prelude::*;

/// Build a minimal valid EDF buffer with the given signals.
/// `signals` is (label, samples_per_record); data records are zeroed.
fn synthetic_edf(
    record_count: i64,
    record_duration: f64,
    signals: &[(&str, usize)],
    data_records: usize,
) -> Vec<u8> {
    fn field(buf: &mut Vec<u8>, text: &str, width: usize) {
        let mut bytes = text.as_bytes().to_vec();
        bytes.truncate(width);
        bytes.resize(width, b' ');
        buf.extend_from_slice(&bytes);
    }

    let mut buf = Vec::new();
    field(&mut buf, "0", 8);
    field(&mut buf, "patient X", 80);
    field(&mut buf, "recording Y", 80);
    field(&mut buf, "02.03.21", 8);
    field(&mut buf, "10.30.00", 8);
    let header_bytes = 256 + signals.len() * 256;
    field(&mut buf, &header_bytes.to_string(), 8);
    field(&mut buf, "", 44);
    field(&mut buf, &record_count.to_string(), 8);
    field(&mut buf, &format!("{record_duration}"), 8);
    field(&mut buf, &signals.len().to_string(), 4);

    for (label, _) in signals {
        field(&mut buf, label, 16);
    }
    for _ in signals {
        field(&mut buf, "transducer", 80);
    }
    for _ in signals {
        field(&mut buf, "uV", 8);
    }
    for _ in signals {
        field(&mut buf, "-100", 8);
    }
    for _ in signals {
        field(&mut buf, "100", 8);
    }
    for _ in signals {
        field(&mut buf, "-2048", 8);
    }
    for _ in signals {
        field(&mut buf, "2048", 8);
    }
    for _ in signals {
        field(&mut buf, "HP:0.1Hz", 80);
    }
    for (_, samples) in signals {
        field(&mut buf, &samples.to_string(), 8);
    }
    for _ in signals {
        field(&mut buf, "", 32);
    }

    let record_size: usize = signals.iter().map(|(_, s)| s * 2).sum();
    buf.extend(std::iter::repeat(0u8).take(data_records * record_size));
    buf
}

/// Build a binary STL buffer with `count` triangles.
fn synthetic_binary_stl(count: u32) -> Vec<u8> {
    let mut buf = vec![0u8; 80];
    buf.extend_from_slice(&count.to_le_bytes());
    for t in 0..count {
        for v in [0.0f32, 0.0, 1.0] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        for corner in 0..3 {
            let (x, y) = match corner {
                0 => (0.0f32, 0.0f32),
                1 => (1.0, 0.0),
                _ => (0.0, 1.0),
            };
            for v in [x + t as f32, y, 0.0] {
                buf.extend_from_slice(&v.to_le_bytes());
            }
        }
        buf.extend_from_slice(&0u16.to_le_bytes());
    }
    buf
}

#[test]
fn edf_envelope_carries_rate_duration_and_labels() {
    let buf = synthetic_edf(4, 2.0, &[("EEG Fpz", 512), ("EMG chin", 512)], 4);
    let source = SourceFile::new("night1.edf", "", buf);
    let envelope = anyform::decode(&source).unwrap();

    assert_eq!(envelope.classification.modality, Modality::BioSignal);
    assert_eq!(envelope.metadata.format, "EDF");
    assert_eq!(envelope.metadata.sample_rate_hz, Some(256.0));
    assert_eq!(envelope.metadata.duration_secs, Some(8.0));
    assert_eq!(envelope.metadata.channel_count, Some(2));

    let Payload::Channels(set) = &envelope.payload else {
        panic!("expected channels");
    };
    assert_eq!(set.channels[0].label, "EEG Fpz");
    assert_eq!(set.samples_per_channel(), 4 * 512);
}

#[test]
fn binary_stl_envelope_reports_resolved_variant() {
    let source = SourceFile::new("bracket.stl", "", synthetic_binary_stl(12));
    let envelope = anyform::decode(&source).unwrap();

    // Classification stays at the family level; metadata carries the
    // variant only the decoder can determine.
    assert_eq!(envelope.classification.format, ConcreteFormat::Stl);
    assert_eq!(envelope.metadata.format, "STL-Binary");
    assert_eq!(envelope.metadata.face_count, Some(12));
    assert_eq!(envelope.metadata.vertex_count, Some(36));

    let Payload::Mesh(mesh) = &envelope.payload else {
        panic!("expected mesh");
    };
    assert_eq!(mesh.triangle_count(), 12);
}

#[test]
fn ascii_stl_envelope_reports_ascii_variant() {
    let text = "solid t\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nvertex 0 1 0\nendloop\nendfacet\nendsolid t\n";
    let source = SourceFile::new("part.stl", "", text.as_bytes().to_vec());
    let envelope = anyform::decode(&source).unwrap();
    assert_eq!(envelope.metadata.format, "STL-ASCII");
    assert_eq!(envelope.metadata.face_count, Some(1));
}

#[test]
fn csv_envelope_carries_column_names_and_rows() {
    let source = SourceFile::new(
        "trial.csv",
        "text/csv",
        b"time,value\n0,1.5\n1,2.5\n2,3.5\n".to_vec(),
    );
    let envelope = anyform::decode(&source).unwrap();

    assert_eq!(envelope.classification.modality, Modality::TabularSeries);
    assert_eq!(
        envelope.metadata.column_names,
        Some(vec!["time".to_string(), "value".to_string()])
    );
    assert_eq!(envelope.metadata.row_count, Some(3));
}

#[test]
fn headerless_csv_gets_synthetic_channel_names() {
    let source = SourceFile::new("raw.csv", "", b"1,2\n3,4\n5,6\n".to_vec());
    let envelope = anyform::decode(&source).unwrap();
    assert_eq!(
        envelope.metadata.column_names,
        Some(vec!["Ch1".to_string(), "Ch2".to_string()])
    );
}

#[test]
fn pcd_declared_count_beyond_rows_truncates() {
    let text = "FIELDS x y z\nPOINTS 100\nDATA ascii\n0 0 0\n1 1 1\n2 2 2\n";
    let source = SourceFile::new("scan.pcd", "", text.as_bytes().to_vec());
    let envelope = anyform::decode(&source).unwrap();
    assert_eq!(envelope.metadata.point_count, Some(3));
}

#[test]
fn obj_quad_keeps_its_arity_through_the_envelope() {
    let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
    let source = SourceFile::new("plane.obj", "", text.as_bytes().to_vec());
    let envelope = anyform::decode(&source).unwrap();

    let Payload::Mesh(mesh) = &envelope.payload else {
        panic!("expected mesh");
    };
    assert_eq!(mesh.faces[0].len(), 4);
    assert_eq!(mesh.triangle_count(), 2);
}

#[test]
fn unknown_extension_with_audio_mime_classifies_as_audio() {
    let source = SourceFile::new("stream.bin", "audio/ogg", vec![1, 2, 3]);
    let envelope = anyform::decode(&source).unwrap();
    assert_eq!(envelope.classification.modality, Modality::Audio);
    assert!(matches!(envelope.payload, Payload::Opaque(_)));
    assert_eq!(
        suggested_view(envelope.classification.modality),
        ViewMode::Waveform
    );
}

#[test]
fn unrecognized_file_never_fails() {
    let source = SourceFile::new("mystery.qqq", "application/x-unknown", vec![0xFF; 64]);
    let envelope = anyform::decode(&source).unwrap();
    assert_eq!(envelope.classification.modality, Modality::Opaque);
    let Payload::Opaque(bytes) = &envelope.payload else {
        panic!("expected opaque passthrough");
    };
    assert_eq!(bytes.len(), 64);
    assert_eq!(
        suggested_view(envelope.classification.modality),
        ViewMode::Generic
    );
}

#[test]
fn gzipped_nifti_is_an_unsupported_variant() {
    let mut bytes = vec![0x1F, 0x8B, 0x08];
    bytes.extend_from_slice(&[0u8; 400]);
    let source = SourceFile::new("brain.nii.gz", "", bytes);
    let err = anyform::decode(&source).unwrap_err();
    assert!(matches!(err, DecodeError::UnsupportedVariant(_)));
}

#[test]
fn decoding_is_deterministic() {
    let buf = synthetic_edf(2, 1.0, &[("C3", 64)], 2);
    let source = SourceFile::new("rec.edf", "", buf);
    let first = anyform::decode(&source).unwrap();
    let second = anyform::decode(&source).unwrap();
    assert_eq!(first, second);
}

#[test]
fn truncated_binary_stl_is_a_hard_error() {
    let mut buf = synthetic_binary_stl(5);
    buf.truncate(buf.len() - 10);
    let source = SourceFile::new("broken.stl", "", buf);
    let err = anyform::decode(&source).unwrap_err();
    assert!(matches!(err, DecodeError::TruncatedInput { .. }));
}

#[test]
fn json_array_of_objects_projects_to_columns() {
    let source = SourceFile::new(
        "run.json",
        "application/json",
        br#"[{"t":0,"v":1.0},{"t":1,"v":2.0}]"#.to_vec(),
    );
    let envelope = anyform::decode(&source).unwrap();
    assert_eq!(
        envelope.metadata.column_names,
        Some(vec!["t".to_string(), "v".to_string()])
    );
    assert_eq!(envelope.metadata.row_count, Some(2));
}
