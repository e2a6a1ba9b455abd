use std::path::Path;

use crate::item::{AttributeValue, Item, LoadedItem};
use crate::size::format_size;
use crate::specification::{FileSpecifications, PreviewKind};

const EXCERPT_LIMIT: usize = 4096;

/// One labelled row of the details screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttributeRow {
    pub label: &'static str,
    pub value: AttributeValue,
}

impl FileAttributeRow {
    /// Size rendered in binary units; other values are left to the host
    pub fn size_text(&self) -> Option<String> {
        match self.value {
            AttributeValue::Bytes(bytes) => Some(format_size(bytes)),
            _ => None,
        }
    }
}

/// Details of a loaded file: title, preview kind and attribute rows
#[derive(Debug, Clone)]
pub struct FileViewModel {
    item: Item,
    preview_kind: PreviewKind,
    rows: Vec<FileAttributeRow>,
    excerpt: Option<String>,
}

impl FileViewModel {
    pub fn new(loaded: LoadedItem<Vec<u8>>, specifications: &FileSpecifications) -> Self {
        let attributes = &loaded.attributes;
        let rows = [
            ("Size", attributes.size().map(AttributeValue::Bytes)),
            ("Created", attributes.created().map(AttributeValue::Time)),
            ("Modified", attributes.modified().map(AttributeValue::Time)),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.map(|value| FileAttributeRow { label, value }))
        .collect();

        let preview_kind = specifications
            .kind_for(&loaded.item)
            .unwrap_or(PreviewKind::Unknown);

        Self {
            excerpt: text_excerpt(&loaded.resource),
            item: loaded.item,
            preview_kind,
            rows,
        }
    }

    pub fn title(&self) -> String {
        self.item.name()
    }

    pub fn path(&self) -> &Path {
        self.item.path()
    }

    pub fn preview_kind(&self) -> PreviewKind {
        self.preview_kind
    }

    pub fn number_of_attributes(&self) -> usize {
        self.rows.len()
    }

    pub fn attribute(&self, index: usize) -> Option<&FileAttributeRow> {
        self.rows.get(index)
    }

    pub fn attributes(&self) -> &[FileAttributeRow] {
        &self.rows
    }

    /// Leading text of the file, `None` for binary content
    pub fn text_excerpt(&self) -> Option<&str> {
        self.excerpt.as_deref()
    }
}

fn text_excerpt(data: &[u8]) -> Option<String> {
    let head = &data[..data.len().min(EXCERPT_LIMIT)];
    if head.contains(&0) {
        return None;
    }

    // The cut may split a multi-byte character
    let text = match std::str::from_utf8(head) {
        Ok(text) => text,
        Err(e) if e.error_len().is_none() => std::str::from_utf8(&head[..e.valid_up_to()]).ok()?,
        Err(_) => return None,
    };
    Some(text.to_string())
}
