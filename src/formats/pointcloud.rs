//! Point cloud decoders: plain XYZ-family text and ASCII PCD.
//!
//! Both are lenient by policy: partial point data is more useful than a
//! total failure, so malformed rows are skipped with a warning and a
//! declared point count that exceeds the rows actually present silently
//! truncates.

use log::{debug, warn};

use crate::envelope::PointCloud;
use crate::error::DecodeError;
use crate::text;

/// Decode whitespace-delimited XYZ/PTS/ASC text.
///
/// Each usable line starts with three numeric tokens (x, y, z); when at
/// least six are present, tokens 4-6 are RGB. Lines with fewer than three
/// numeric tokens are skipped, never fatal.
pub fn decode_xyz(bytes: &[u8]) -> Result<PointCloud, DecodeError> {
    let content = text::decode_text(bytes);
    let mut cloud = PointCloud::default();
    let mut saw_color = false;
    let mut skipped = 0usize;

    for line in text::non_empty_lines(&content) {
        if line.starts_with('#') || line.starts_with("//") {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let numeric: Vec<f64> = tokens.iter().map_while(|t| text::coerce_f64(t)).collect();
        if numeric.len() < 3 {
            // Header rows and malformed lines land here.
            skipped += 1;
            continue;
        }
        cloud
            .points
            .push([numeric[0] as f32, numeric[1] as f32, numeric[2] as f32]);
        if numeric.len() >= 6 {
            saw_color = true;
            cloud.colors.push(normalize_rgb([
                numeric[3] as f32,
                numeric[4] as f32,
                numeric[5] as f32,
            ]));
        } else {
            // Keep colors parallel; a later all-numeric row may carry RGB.
            cloud.colors.push([0.0; 3]);
        }
    }

    if !saw_color {
        cloud.colors.clear();
    }
    if skipped > 0 {
        warn!("xyz decode: skipped {skipped} non-point lines");
    }
    cloud.validate()?;
    debug!("xyz decode: {} points", cloud.points.len());
    Ok(cloud)
}

/// Decode an ASCII PCD buffer.
///
/// Header lines declare `FIELDS <names...>` and `POINTS <count>`; the
/// `DATA` line marks the start of the point block, and each data row is
/// parsed positionally against the declared field list.
pub fn decode_pcd(bytes: &[u8]) -> Result<PointCloud, DecodeError> {
    let content = text::decode_text(bytes);
    let mut lines = text::non_empty_lines(&content);

    let mut fields: Vec<String> = Vec::new();
    let mut declared_points: Option<usize> = None;
    let mut in_data = false;

    for line in lines.by_ref() {
        if line.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.split_first() {
            Some((&"FIELDS", names)) => {
                fields = names.iter().map(|s| s.to_string()).collect();
            }
            Some((&"POINTS", [count])) => {
                declared_points = count.parse().ok();
            }
            Some((&"DATA", kind)) => {
                match kind.first() {
                    Some(&"ascii") | None => {}
                    Some(other) => {
                        return Err(DecodeError::UnsupportedVariant(format!(
                            "PCD data encoding {other:?}"
                        )))
                    }
                }
                in_data = true;
                break;
            }
            // VERSION, SIZE, TYPE, COUNT, WIDTH, HEIGHT, VIEWPOINT.
            _ => {}
        }
    }

    if !in_data {
        return Err(DecodeError::malformed("pcd: no DATA line in header"));
    }
    if fields.is_empty() {
        return Err(DecodeError::malformed("pcd: no FIELDS declaration"));
    }

    let index_of = |name: &str| fields.iter().position(|f| f == name);
    let (ix, iy, iz) = match (index_of("x"), index_of("y"), index_of("z")) {
        (Some(x), Some(y), Some(z)) => (x, y, z),
        _ => {
            return Err(DecodeError::malformed(format!(
                "pcd: FIELDS {fields:?} lack x/y/z"
            )))
        }
    };
    let packed_rgb = index_of("rgb");
    let split_rgb = match (index_of("r"), index_of("g"), index_of("b")) {
        (Some(r), Some(g), Some(b)) => Some((r, g, b)),
        _ => None,
    };
    let intensity = index_of("intensity");

    // The declared count is untrusted; bound the pre-size by what the
    // buffer could possibly hold (a point row is at least "0 0 0\n").
    let capacity = declared_points.unwrap_or(0).min(content.len() / 6);
    let mut cloud = PointCloud {
        points: Vec::with_capacity(capacity),
        colors: Vec::new(),
        intensities: Vec::new(),
    };

    for line in lines {
        if declared_points.is_some_and(|n| cloud.points.len() >= n) {
            break;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let value = |i: usize| tokens.get(i).and_then(|t| text::coerce_f64(t));

        let (Some(x), Some(y), Some(z)) = (value(ix), value(iy), value(iz)) else {
            warn!("pcd decode: skipping malformed row {line:?}");
            continue;
        };
        cloud.points.push([x as f32, y as f32, z as f32]);

        if let Some(rgb) = packed_rgb.and_then(value) {
            cloud.colors.push(unpack_rgb_float(rgb as f32));
        } else if let Some((r, g, b)) = split_rgb {
            if let (Some(r), Some(g), Some(b)) = (value(r), value(g), value(b)) {
                cloud
                    .colors
                    .push(normalize_rgb([r as f32, g as f32, b as f32]));
            }
        }
        if let Some(i) = intensity.and_then(value) {
            cloud.intensities.push(i as f32);
        }
    }

    // A declared count larger than the rows present truncates silently;
    // point clouds may be clipped.
    if let Some(declared) = declared_points {
        if cloud.points.len() < declared {
            debug!(
                "pcd decode: {} of {declared} declared points present",
                cloud.points.len()
            );
        }
    }

    // Color/intensity rows that did not parse on every line would break
    // the parallel-array invariant; drop the ragged list instead.
    if cloud.colors.len() != cloud.points.len() {
        cloud.colors.clear();
    }
    if cloud.intensities.len() != cloud.points.len() {
        cloud.intensities.clear();
    }

    cloud.validate()?;
    Ok(cloud)
}

/// PCL packs colors as `0x00RRGGBB` reinterpreted as a float.
fn unpack_rgb_float(packed: f32) -> [f32; 3] {
    let bits = packed.to_bits();
    let r = ((bits >> 16) & 0xFF) as f32 / 255.0;
    let g = ((bits >> 8) & 0xFF) as f32 / 255.0;
    let b = (bits & 0xFF) as f32 / 255.0;
    [r, g, b]
}

/// Accept 0..=1 floats as-is; larger values are assumed 0..=255 bytes.
fn normalize_rgb(rgb: [f32; 3]) -> [f32; 3] {
    if rgb.iter().any(|&c| c > 1.0) {
        [rgb[0] / 255.0, rgb[1] / 255.0, rgb[2] / 255.0]
    } else {
        rgb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xyz_lines_with_color_and_without() {
        let text = "x y z r g b\n0 0 0 255 0 0\n1 1 1 0 255 0\n";
        let cloud = decode_xyz(text.as_bytes()).unwrap();
        assert_eq!(cloud.points.len(), 2);
        assert_eq!(cloud.colors.len(), 2);
        assert_eq!(cloud.colors[0], [1.0, 0.0, 0.0]);
    }

    #[test]
    fn xyz_short_lines_are_skipped_not_fatal() {
        let text = "1 2 3\nnot a point\n4 5\n6 7 8\n";
        let cloud = decode_xyz(text.as_bytes()).unwrap();
        assert_eq!(cloud.points.len(), 2);
        assert!(cloud.colors.is_empty());
    }

    #[test]
    fn xyz_without_color_has_empty_color_list() {
        let cloud = decode_xyz(b"0 0 0\n1 0 0\n").unwrap();
        assert!(cloud.colors.is_empty());
        assert_eq!(cloud.points.len(), 2);
    }

    const PCD_HEADER: &str = "\
# .PCD v0.7 - Point Cloud Data file format
VERSION 0.7
FIELDS x y z intensity
SIZE 4 4 4 4
TYPE F F F F
COUNT 1 1 1 1
WIDTH 10
HEIGHT 1
VIEWPOINT 0 0 0 1 0 0 0
POINTS 1000
DATA ascii
";

    #[test]
    fn pcd_declared_count_truncates_to_actual_rows() {
        let mut text = PCD_HEADER.to_string();
        for i in 0..10 {
            text.push_str(&format!("{i} 0 0 0.5\n"));
        }
        let cloud = decode_pcd(text.as_bytes()).unwrap();
        assert_eq!(cloud.points.len(), 10);
        assert_eq!(cloud.intensities.len(), 10);
    }

    #[test]
    fn pcd_packed_rgb_unpacks_to_bytes() {
        // PCL packs 0x00RRGGBB into the float's bit pattern.
        let packed = f32::from_bits(0x00FF_8040);
        let text = format!("FIELDS x y z rgb\nPOINTS 1\nDATA ascii\n0 0 0 {packed}\n");
        let cloud = decode_pcd(text.as_bytes()).unwrap();
        assert_eq!(cloud.points.len(), 1);
        let [r, g, b] = cloud.colors[0];
        assert!((r - 1.0).abs() < 1e-6);
        assert!((g - 128.0 / 255.0).abs() < 1e-6);
        assert!((b - 64.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn pcd_absurd_declared_count_still_truncates_to_actual_rows() {
        let text = "FIELDS x y z\nPOINTS 1000000000000000000\nDATA ascii\n0 0 0\n";
        let cloud = decode_pcd(text.as_bytes()).unwrap();
        assert_eq!(cloud.points.len(), 1);
    }

    #[test]
    fn pcd_without_data_line_is_malformed() {
        let text = "FIELDS x y z\nPOINTS 2\n0 0 0\n";
        assert!(matches!(
            decode_pcd(text.as_bytes()),
            Err(DecodeError::MalformedHeader(_))
        ));
    }

    #[test]
    fn pcd_binary_data_is_unsupported() {
        let text = "FIELDS x y z\nPOINTS 0\nDATA binary\n";
        assert!(matches!(
            decode_pcd(text.as_bytes()),
            Err(DecodeError::UnsupportedVariant(_))
        ));
    }
}
