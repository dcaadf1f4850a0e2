use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use anyform::envelope::{Payload, TabularSeries};
use anyform::source::SourceFile;

/// Decode a file and print its envelope summary
pub fn run(file: PathBuf, mime: String, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let mut source = SourceFile::from_path(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    source.mime = mime;

    info!("Decoding {} ({} bytes)", source.name, source.len());
    let envelope = anyform::decode(&source)
        .with_context(|| format!("Failed to decode {}", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&envelope.metadata)?);
        return Ok(());
    }

    println!("{}", heading("anyform File Information"));
    println!("========================");
    println!("File:     {}", envelope.metadata.filename);
    println!("Size:     {} bytes", envelope.metadata.byte_size);
    println!("Modality: {}", envelope.metadata.modality);
    println!("Format:   {}", envelope.metadata.format);
    println!(
        "View:     {:?}",
        anyform::envelope::suggested_view(envelope.classification.modality)
    );
    println!();

    print_payload(&envelope.payload);
    Ok(())
}

fn print_payload(payload: &Payload) {
    println!("{}", heading("Payload:"));
    match payload {
        Payload::Channels(set) => {
            println!("  Channels: {}", set.channels.len());
            println!("  Samples per channel: {}", set.samples_per_channel());
            if let Some(rate) = set.sample_rate_hz {
                println!("  Sample rate: {rate} Hz");
            }
            if let Some(duration) = set.duration_secs {
                println!("  Duration: {duration} s");
            }
            for channel in &set.channels {
                println!("    {}", channel.label);
            }
        }
        Payload::Volume(grid) => {
            let [x, y, z] = grid.dims;
            println!("  Dimensions: {x} x {y} x {z}");
            let [sx, sy, sz] = grid.voxel_size;
            println!("  Voxel size: {sx} x {sy} x {sz}");
            println!("  Voxels: {}", grid.voxel_count());
            println!("  Rescale: raw * {} + {}", grid.scale, grid.intercept);
        }
        Payload::Mesh(mesh) => {
            println!("  Vertices: {}", mesh.positions.len());
            println!("  Faces: {}", mesh.faces.len());
            println!("  Triangles (after fan): {}", mesh.triangle_count());
            println!("  Normals: {}", mesh.normals.len());
            println!("  Texcoords: {}", mesh.texcoords.len());
        }
        Payload::Points(cloud) => {
            println!("  Points: {}", cloud.points.len());
            println!("  Colors: {}", if cloud.colors.is_empty() { "no" } else { "yes" });
            println!(
                "  Intensities: {}",
                if cloud.intensities.is_empty() { "no" } else { "yes" }
            );
        }
        Payload::Table(TabularSeries::Columns(columns)) => {
            println!("  Columns: {}", columns.len());
            println!(
                "  Rows: {}",
                columns.first().map_or(0, |c| c.values.len())
            );
            for column in columns {
                let kind = match &column.values {
                    anyform::envelope::ColumnValues::Numeric(_) => "numeric",
                    anyform::envelope::ColumnValues::Text(_) => "text",
                };
                println!("    {} ({kind})", column.name);
            }
        }
        Payload::Table(TabularSeries::Json(value)) => {
            let shape = match value {
                serde_json::Value::Object(map) => format!("object, {} keys", map.len()),
                serde_json::Value::Array(items) => format!("array, {} items", items.len()),
                other => format!("{other}"),
            };
            println!("  JSON document ({shape})");
        }
        Payload::Raster(raster) => {
            println!("  Dimensions: {} x {}", raster.width, raster.height);
            println!("  Pixel data: {} bytes RGBA", raster.rgba.len());
        }
        Payload::Opaque(bytes) => {
            println!("  Opaque: {} bytes, passed through undecoded", bytes.len());
        }
    }
}

#[cfg(feature = "colorized_output")]
fn heading(text: &str) -> String {
    console::style(text).bold().to_string()
}

#[cfg(not(feature = "colorized_output"))]
fn heading(text: &str) -> String {
    text.to_string()
}
