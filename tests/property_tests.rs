//! Property-based tests for the classification and decode front door.

use anyform::classify::{classify, Modality};
use anyform::source::SourceFile;
use anyform::text::coerce_f64;
use proptest::prelude::*;

/// Build a binary STL buffer with `count` zeroed triangles.
fn binary_stl(count: u32) -> Vec<u8> {
    let mut buf = vec![0u8; 80];
    buf.extend_from_slice(&count.to_le_bytes());
    buf.extend(std::iter::repeat(0u8).take(count as usize * 50));
    buf
}

proptest! {
    /// Classification is total: any name/MIME pair yields a classification
    /// without panicking, and modality/format stay consistent.
    #[test]
    fn classify_is_total(name in ".*", mime in ".*") {
        let c = classify(&name, &mime);
        prop_assert_eq!(c.modality, c.format.modality());
    }

    /// A file with no recognized extension and no audio/image MIME always
    /// lands in the opaque bucket.
    #[test]
    fn unknown_inputs_fall_through_to_opaque(
        name in "[a-z]{1,12}\\.(zzz|dat[0-9])",
        mime in "(text|application)/[a-z]{1,10}",
    ) {
        let c = classify(&name, &mime);
        prop_assert_eq!(c.modality, Modality::Opaque);
    }

    /// Numeric coercion never panics, and accepted tokens are finite or
    /// explicit non-finite spellings.
    #[test]
    fn coerce_never_panics(token in ".{0,40}") {
        let _ = coerce_f64(&token);
    }

    /// Declared binary STL counts decode to exactly that many faces as
    /// long as the buffer length matches the count.
    #[test]
    fn binary_stl_faces_match_declared_count(count in 0u32..200) {
        let source = SourceFile::new("x.stl", "", binary_stl(count));
        let envelope = anyform::decode(&source).unwrap();
        prop_assert_eq!(envelope.metadata.face_count, Some(count as usize));
        prop_assert_eq!(envelope.metadata.format.as_str(), "STL-Binary");
    }

    /// Decoding arbitrary bytes under an unknown name never fails; the
    /// opaque path is a guaranteed fallback.
    #[test]
    fn opaque_decode_always_succeeds(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let source = SourceFile::new("mystery.blob", "", bytes.clone());
        let envelope = anyform::decode(&source).unwrap();
        prop_assert_eq!(envelope.metadata.byte_size, bytes.len());
    }
}
