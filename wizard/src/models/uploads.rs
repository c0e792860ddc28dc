//! Upload fields attached to a lead.
//!
//! Each field enforces its own cap when files are added; the aggregate size
//! across all fields is always computed from the lists, never stored.

use std::path::PathBuf;

/// Where an attachment's bytes come from. Disk files are only read when the
/// payload is assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Disk(PathBuf),
    Memory(Vec<u8>),
}

/// An opaque file handle: name, size and type are read, content is never
/// modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedFile {
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub source: FileSource,
}

impl AttachedFile {
    pub fn in_memory(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            content_type: content_type.into(),
            source: FileSource::Memory(bytes),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadField {
    Logo,
    BrandGuide,
    GalleryPhotos,
    TeamPhotos,
    Documents,
}

impl UploadField {
    pub const ALL: [UploadField; 5] = [
        UploadField::Logo,
        UploadField::BrandGuide,
        UploadField::GalleryPhotos,
        UploadField::TeamPhotos,
        UploadField::Documents,
    ];

    /// Multipart part name.
    pub fn form_key(&self) -> &'static str {
        match self {
            UploadField::Logo => "logo",
            UploadField::BrandGuide => "brandGuide",
            UploadField::GalleryPhotos => "galleryPhotos",
            UploadField::TeamPhotos => "teamPhotos",
            UploadField::Documents => "documents",
        }
    }

    pub fn max_files(&self) -> usize {
        match self {
            UploadField::Logo | UploadField::BrandGuide => 1,
            UploadField::GalleryPhotos => 20,
            UploadField::TeamPhotos => 5,
            UploadField::Documents => 10,
        }
    }

    pub fn is_multiple(&self) -> bool {
        self.max_files() > 1
    }

    pub fn label(&self) -> &'static str {
        match self {
            UploadField::Logo => "Logo",
            UploadField::BrandGuide => "Brand guide",
            UploadField::GalleryPhotos => "Gallery photos",
            UploadField::TeamPhotos => "Team photos",
            UploadField::Documents => "Documents",
        }
    }

    pub fn help_text(&self) -> &'static str {
        match self {
            UploadField::Logo => "PNG, JPG or SVG. High resolution if you have it.",
            UploadField::BrandGuide => "Colours, fonts, anything you already use.",
            UploadField::GalleryPhotos => "Photos of your work, up to 20.",
            UploadField::TeamPhotos => "Faces build trust, up to 5.",
            UploadField::Documents => "Menus, price lists, brochures, up to 10.",
        }
    }

    /// Accepted type filter, in the same `accept` syntax a file picker uses.
    pub fn accept(&self) -> &'static str {
        match self {
            UploadField::Logo => "image/*,.svg",
            UploadField::BrandGuide => ".pdf,image/*",
            UploadField::GalleryPhotos | UploadField::TeamPhotos => "image/*",
            UploadField::Documents => ".pdf,.doc,.docx,.txt,image/*",
        }
    }

    /// Whether a file passes this field's accept filter (by MIME wildcard,
    /// exact MIME type, or file extension).
    pub fn accepts(&self, file: &AttachedFile) -> bool {
        let name = file.name.to_ascii_lowercase();
        let content_type = file.content_type.to_ascii_lowercase();
        self.accept().split(',').any(|rule| {
            let rule = rule.trim().to_ascii_lowercase();
            if let Some(ext) = rule.strip_prefix('.') {
                name.ends_with(&format!(".{}", ext))
            } else if let Some(major) = rule.strip_suffix("/*") {
                content_type.starts_with(&format!("{}/", major))
            } else {
                content_type == rule
            }
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Uploads {
    logo: Option<AttachedFile>,
    brand_guide: Option<AttachedFile>,
    gallery_photos: Vec<AttachedFile>,
    team_photos: Vec<AttachedFile>,
    documents: Vec<AttachedFile>,
}

impl Uploads {
    pub fn files(&self, field: UploadField) -> &[AttachedFile] {
        match field {
            UploadField::Logo => self.logo.as_slice(),
            UploadField::BrandGuide => self.brand_guide.as_slice(),
            UploadField::GalleryPhotos => &self.gallery_photos,
            UploadField::TeamPhotos => &self.team_photos,
            UploadField::Documents => &self.documents,
        }
    }

    /// Add newly chosen files to a field.
    ///
    /// Single-file fields keep only the first incoming file and replace the
    /// previous one. Multi-file fields append and then truncate to the cap,
    /// so files beyond the cap are dropped from the end. Choosing nothing
    /// leaves the field untouched.
    pub fn add(&mut self, field: UploadField, incoming: Vec<AttachedFile>) {
        if incoming.is_empty() {
            return;
        }
        match field {
            UploadField::Logo => self.logo = incoming.into_iter().next(),
            UploadField::BrandGuide => self.brand_guide = incoming.into_iter().next(),
            UploadField::GalleryPhotos => {
                append_capped(&mut self.gallery_photos, incoming, field.max_files())
            }
            UploadField::TeamPhotos => {
                append_capped(&mut self.team_photos, incoming, field.max_files())
            }
            UploadField::Documents => {
                append_capped(&mut self.documents, incoming, field.max_files())
            }
        }
    }

    /// Remove the file at `index`, keeping the order of the rest.
    pub fn remove(&mut self, field: UploadField, index: usize) -> Option<AttachedFile> {
        match field {
            UploadField::Logo => take_single(&mut self.logo, index),
            UploadField::BrandGuide => take_single(&mut self.brand_guide, index),
            UploadField::GalleryPhotos => take_at(&mut self.gallery_photos, index),
            UploadField::TeamPhotos => take_at(&mut self.team_photos, index),
            UploadField::Documents => take_at(&mut self.documents, index),
        }
    }

    pub fn clear(&mut self, field: UploadField) {
        match field {
            UploadField::Logo => self.logo = None,
            UploadField::BrandGuide => self.brand_guide = None,
            UploadField::GalleryPhotos => self.gallery_photos.clear(),
            UploadField::TeamPhotos => self.team_photos.clear(),
            UploadField::Documents => self.documents.clear(),
        }
    }

    pub fn is_at_limit(&self, field: UploadField) -> bool {
        self.files(field).len() >= field.max_files()
    }

    /// Every attachment with its part name, in field order.
    pub fn iter_parts(&self) -> impl Iterator<Item = (&'static str, &AttachedFile)> + '_ {
        UploadField::ALL
            .into_iter()
            .flat_map(move |field| self.files(field).iter().map(move |f| (field.form_key(), f)))
    }

    pub fn file_count(&self) -> usize {
        UploadField::ALL.iter().map(|f| self.files(*f).len()).sum()
    }

    /// Sum of every attached file's size across all fields.
    pub fn total_size(&self) -> u64 {
        self.iter_parts().map(|(_, f)| f.size).sum()
    }
}

fn append_capped(list: &mut Vec<AttachedFile>, incoming: Vec<AttachedFile>, max: usize) {
    list.extend(incoming);
    list.truncate(max);
}

fn take_at(list: &mut Vec<AttachedFile>, index: usize) -> Option<AttachedFile> {
    if index < list.len() {
        Some(list.remove(index))
    } else {
        None
    }
}

fn take_single(slot: &mut Option<AttachedFile>, index: usize) -> Option<AttachedFile> {
    if index == 0 {
        slot.take()
    } else {
        None
    }
}

/// Human-readable size, e.g. `512 B`, `14 KB`, `2.3 MB`.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.0} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
