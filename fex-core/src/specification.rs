use serde::{Deserialize, Serialize};

use crate::item::Item;

/// How a file's content can be previewed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewKind {
    Image,
    Video,
    Audio,
    Pdf,
    Unknown,
}

impl PreviewKind {
    pub fn label(&self) -> &'static str {
        match self {
            PreviewKind::Image => "Image",
            PreviewKind::Video => "Video",
            PreviewKind::Audio => "Audio",
            PreviewKind::Pdf => "PDF document",
            PreviewKind::Unknown => "Document",
        }
    }
}

/// Extensions previewed as one kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSpecification {
    pub kind: PreviewKind,
    pub extensions: Vec<String>,
}

impl FileSpecification {
    pub fn new(kind: PreviewKind, extensions: &[&str]) -> Self {
        Self {
            kind,
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
        }
    }

    fn matches(&self, extension: &str) -> bool {
        self.extensions.iter().any(|e| e == extension)
    }
}

/// Ordered extension table, first match wins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileSpecifications(Vec<FileSpecification>);

impl Default for FileSpecifications {
    fn default() -> Self {
        Self(vec![
            FileSpecification::new(PreviewKind::Image, &["png", "jpg", "jpeg"]),
            FileSpecification::new(PreviewKind::Video, &["mp4", "avi", "mkv", "mov"]),
            FileSpecification::new(PreviewKind::Audio, &["mp3", "wav"]),
            FileSpecification::new(PreviewKind::Pdf, &["pdf"]),
        ])
    }
}

impl FileSpecifications {
    /// Consult `specification` before every entry already present
    pub fn with_specification(mut self, specification: FileSpecification) -> Self {
        self.0.insert(0, specification);
        self
    }

    /// Preview kind of a file. Directories are never classified.
    pub fn kind_for(&self, item: &Item) -> Option<PreviewKind> {
        if item.is_directory() {
            return None;
        }

        let extension = item.extension();
        Some(
            self.0
                .iter()
                .find(|spec| spec.matches(&extension))
                .map(|spec| spec.kind)
                .unwrap_or(PreviewKind::Unknown),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileSpecification> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn file(name: &str) -> Item {
        Item::file(format!("/data/{name}"), SystemTime::UNIX_EPOCH)
    }

    #[test]
    fn test_builtin_table() {
        let specs = FileSpecifications::default();
        assert_eq!(specs.kind_for(&file("a.jpeg")), Some(PreviewKind::Image));
        assert_eq!(specs.kind_for(&file("a.mkv")), Some(PreviewKind::Video));
        assert_eq!(specs.kind_for(&file("a.wav")), Some(PreviewKind::Audio));
        assert_eq!(specs.kind_for(&file("a.pdf")), Some(PreviewKind::Pdf));
        assert_eq!(specs.kind_for(&file("a.txt")), Some(PreviewKind::Unknown));
        assert_eq!(specs.kind_for(&file("README")), Some(PreviewKind::Unknown));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let specs = FileSpecifications::default();
        assert_eq!(specs.kind_for(&file("a.PNG")), Some(PreviewKind::Unknown));
    }

    #[test]
    fn test_directories_are_not_classified() {
        let specs = FileSpecifications::default();
        let dir = Item::directory("/data/photos.png", SystemTime::UNIX_EPOCH);
        assert_eq!(specs.kind_for(&dir), None);
    }

    #[test]
    fn test_custom_specification_takes_priority() {
        let specs = FileSpecifications::default()
            .with_specification(FileSpecification::new(PreviewKind::Pdf, &["png", "PNG"]));
        assert_eq!(specs.kind_for(&file("a.png")), Some(PreviewKind::Pdf));
        assert_eq!(specs.kind_for(&file("a.PNG")), Some(PreviewKind::Pdf));
        assert_eq!(specs.kind_for(&file("a.jpg")), Some(PreviewKind::Image));
    }

    #[test]
    fn test_deserialize_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            specifications: FileSpecifications,
        }

        let wrapper: Wrapper = toml::from_str(
            r#"
            [[specifications]]
            kind = "audio"
            extensions = ["flac", "ogg"]
            "#,
        )
        .unwrap();

        assert_eq!(
            wrapper.specifications.kind_for(&file("song.flac")),
            Some(PreviewKind::Audio)
        );
        // A deserialized table replaces the built-ins
        assert_eq!(
            wrapper.specifications.kind_for(&file("a.png")),
            Some(PreviewKind::Unknown)
        );
    }
}
