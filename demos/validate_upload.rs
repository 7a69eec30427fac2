//! Example demonstrating upload MIME-type validation
//!
//! Shows the three allow-list entry shapes (full type, type family, bare
//! subtype token), the declared-header cross-check, and the failure reasons
//! recorded for rejected files.

use anyhow::Result;
use mime_type_validator::{MimeTypeValidator, UploadMetadata};

#[tokio::main]
async fn main() -> Result<()> {
    let work_dir = tempfile::tempdir()?;

    // Test files with different content signatures
    let png_bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]; // PNG header
    let jpeg_bytes = vec![0xFF, 0xD8, 0xFF, 0xE0]; // JPEG header
    let exe_bytes = vec![0x4D, 0x5A]; // EXE header (MZ)

    let samples = [
        ("photo.png", png_bytes),
        ("photo.jpg", jpeg_bytes),
        ("tool.exe", exe_bytes),
    ];
    for (name, bytes) in &samples {
        std::fs::write(work_dir.path().join(name), bytes)?;
    }

    println!("Upload MIME-Type Validation Example");
    println!();

    // === EXAMPLE 1: Full-type allow-list ===
    println!("1. Allow only image/png and image/jpeg:");
    let mut validator = MimeTypeValidator::new("image/png, image/jpeg");
    for (name, _) in &samples {
        report(&mut validator, work_dir.path().join(name), name).await;
    }
    println!();

    // === EXAMPLE 2: Type-family allow-list ===
    println!("2. Allow the whole image family:");
    let mut validator = MimeTypeValidator::new("image");
    for (name, _) in &samples {
        report(&mut validator, work_dir.path().join(name), name).await;
    }
    println!();

    // === EXAMPLE 3: Declared header must also pass ===
    println!("3. Header cross-check (declared type disagrees with policy):");
    let mut validator = MimeTypeValidator::builder()
        .mime_types(vec!["image/png", "image/jpeg"])
        .header_check(true)
        .build()?;

    let upload = UploadMetadata::new()
        .name("photo.png")
        .content_type("application/octet-stream")
        .tmp_name(work_dir.path().join("photo.png"));

    if validator
        .is_valid(work_dir.path().join("photo.png"), Some(&upload))
        .await
    {
        println!("  photo.png -> ALLOWED");
    } else {
        for (key, message) in validator.messages() {
            println!("  photo.png -> BLOCKED [{key}]: {message}");
        }
    }

    Ok(())
}

async fn report(validator: &mut MimeTypeValidator, path: std::path::PathBuf, name: &str) {
    if validator.is_valid(&path, None).await {
        println!("  {name} -> ALLOWED");
    } else {
        for (key, message) in validator.messages() {
            println!("  {name} -> BLOCKED [{key}]: {message}");
        }
    }
}
