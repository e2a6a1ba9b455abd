mod attributes;

pub use attributes::{AttributeKey, AttributeValue, Attributes};

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::service::Storage;

/// Type of filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Directory,
    File,
}

impl ItemKind {
    pub fn icon(&self) -> &'static str {
        match self {
            ItemKind::Directory => "📁",
            ItemKind::File => "📄",
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, ItemKind::Directory)
    }
}

/// Raw content fetched for an item before parsing
#[derive(Debug, Clone)]
pub enum RawContent {
    /// Full byte content of a file
    Data(Vec<u8>),
    /// Immediate children of a directory with the attributes fetched while listing
    Listing(Vec<(PathBuf, Attributes)>),
}

/// Typed payload of a loaded item
#[derive(Debug, Clone)]
pub enum Resource {
    Data(Vec<u8>),
    Children(Vec<Item>),
}

/// Turns raw content into a resource. Runs on the background I/O thread.
pub type Parser = fn(&dyn Storage, &Attributes, RawContent) -> Option<Resource>;

/// Descriptor of one filesystem entry.
///
/// Equality and hashing only consider the path. Parsing of the entry's
/// content is deferred until the item is loaded through a `FileService`.
#[derive(Clone)]
pub struct Item {
    path: PathBuf,
    kind: ItemKind,
    modified: SystemTime,
    parser: Parser,
}

impl Item {
    /// Build an item from already known metadata without touching the filesystem
    pub fn new(path: impl Into<PathBuf>, kind: ItemKind, modified: SystemTime) -> Self {
        let parser: Parser = match kind {
            ItemKind::Directory => parse_directory,
            ItemKind::File => parse_file,
        };

        Self {
            path: path.into(),
            kind,
            modified,
            parser,
        }
    }

    pub fn directory(path: impl Into<PathBuf>, modified: SystemTime) -> Self {
        Self::new(path, ItemKind::Directory, modified)
    }

    pub fn file(path: impl Into<PathBuf>, modified: SystemTime) -> Self {
        Self::new(path, ItemKind::File, modified)
    }

    /// Build an item from pre-fetched attributes.
    ///
    /// Returns `None` if kind or modification date are missing.
    pub fn from_attributes(path: impl Into<PathBuf>, attributes: &Attributes) -> Option<Self> {
        Some(Self::new(path, attributes.kind()?, attributes.modified()?))
    }

    /// Stat `path` and build an item for it. Returns `None` if nothing exists there.
    pub fn stat(storage: &dyn Storage, path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let attributes = storage.stat(&path).ok()?;
        Self::from_attributes(path, &attributes)
    }

    /// Replace the content parser
    pub fn with_parser(mut self, parser: Parser) -> Self {
        self.parser = parser;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last path component
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }

    /// Extension without the leading dot, empty if there is none
    pub fn extension(&self) -> String {
        extension_of(&self.name())
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn is_directory(&self) -> bool {
        self.kind.is_directory()
    }

    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    pub fn parse(
        &self,
        storage: &dyn Storage,
        attributes: &Attributes,
        raw: RawContent,
    ) -> Option<Resource> {
        (self.parser)(storage, attributes, raw)
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("modified", &self.modified)
            .finish()
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

/// Extension of a file name the way path APIs report it: text after the
/// last dot, unless the name starts with that dot.
pub(crate) fn extension_of(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx + 1..].to_string(),
        _ => String::new(),
    }
}

fn parse_directory(
    _storage: &dyn Storage,
    _attributes: &Attributes,
    raw: RawContent,
) -> Option<Resource> {
    let RawContent::Listing(entries) = raw else {
        panic!("directory item parsed from file data");
    };

    // Children reuse the attributes fetched by the listing
    let children = entries
        .into_iter()
        .filter_map(|(path, attributes)| {
            let child = Item::from_attributes(path.clone(), &attributes);
            if child.is_none() {
                tracing::warn!(path = %path.display(), "skipping child without kind or modification date");
            }
            child
        })
        .collect();

    Some(Resource::Children(children))
}

fn parse_file(_storage: &dyn Storage, _attributes: &Attributes, raw: RawContent) -> Option<Resource> {
    let RawContent::Data(data) = raw else {
        panic!("file item parsed from a directory listing");
    };
    Some(Resource::Data(data))
}

/// An item after its resource has been fetched
#[derive(Debug, Clone)]
pub struct LoadedItem<R> {
    pub item: Item,
    pub attributes: Attributes,
    pub resource: R,
}

impl<R> LoadedItem<R> {
    pub fn new(item: Item, attributes: Attributes, resource: R) -> Self {
        Self {
            item,
            attributes,
            resource,
        }
    }

    pub fn path(&self) -> &Path {
        self.item.path()
    }

    pub fn kind(&self) -> ItemKind {
        self.item.kind()
    }

    pub fn name(&self) -> String {
        self.item.name()
    }

    /// Transform the resource, keeping item and attributes
    pub fn map<U>(self, f: impl FnOnce(R) -> U) -> LoadedItem<U> {
        LoadedItem {
            item: self.item,
            attributes: self.attributes,
            resource: f(self.resource),
        }
    }
}

impl LoadedItem<Resource> {
    /// # Panics
    ///
    /// Panics if the resource is not a directory listing.
    pub fn into_directory(self) -> LoadedItem<Vec<Item>> {
        self.map(|resource| match resource {
            Resource::Children(children) => children,
            Resource::Data(_) => panic!("loaded resource is file data, not a directory listing"),
        })
    }

    /// # Panics
    ///
    /// Panics if the resource is not file data.
    pub fn into_file(self) -> LoadedItem<Vec<u8>> {
        self.map(|resource| match resource {
            Resource::Data(data) => data,
            Resource::Children(_) => panic!("loaded resource is a directory listing, not file data"),
        })
    }
}
