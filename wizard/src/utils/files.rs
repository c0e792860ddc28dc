//! Local file helpers for attaching files from disk.
//!
//! We only read metadata here; content is read when the payload is sent.

use anyhow::Result;
use log::debug;
use std::path::Path;

use crate::models::uploads::{AttachedFile, FileSource};

/// Content type guessed from the file extension. Unknown extensions fall back
/// to `application/octet-stream`.
pub fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Build an attachment handle for a file on disk.
pub fn attach_from_path(path: &Path) -> Result<AttachedFile> {
    let meta = std::fs::metadata(path)
        .map_err(|e| anyhow::anyhow!("Unable to read {}: {}", path.display(), e))?;
    if !meta.is_file() {
        anyhow::bail!("{} is not a file", path.display());
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string());

    let file = AttachedFile {
        name,
        size: meta.len(),
        content_type: guess_content_type(path).to_string(),
        source: FileSource::Disk(path.to_path_buf()),
    };
    debug!(
        "[PHASE: uploads] [STEP: attach] Read metadata for {} ({} bytes, {})",
        file.name, file.size, file.content_type
    );
    Ok(file)
}

/// Read an attachment's bytes.
pub async fn read_contents(file: &AttachedFile) -> std::io::Result<Vec<u8>> {
    match &file.source {
        FileSource::Memory(bytes) => Ok(bytes.clone()),
        FileSource::Disk(path) => tokio::fs::read(path).await,
    }
}
