use anyhow::Result;
use std::path::PathBuf;

use anyform::classify::classify;
use anyform::envelope::suggested_view;

/// Classify a file by name and MIME type without reading it
pub fn run(file: PathBuf, mime: String) -> Result<()> {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let classification = classify(&name, &mime);
    println!("File:     {}", file.display());
    println!("Modality: {}", classification.modality);
    println!("Format:   {}", classification.format);
    println!("View:     {:?}", suggested_view(classification.modality));
    Ok(())
}
