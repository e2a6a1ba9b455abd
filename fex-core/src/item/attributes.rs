use std::collections::BTreeMap;
use std::fs::Metadata;
use std::time::SystemTime;

use super::ItemKind;

/// Filesystem metadata keys carried alongside a loaded item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttributeKey {
    Kind,
    Size,
    CreationDate,
    ModificationDate,
    ReadOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Kind(ItemKind),
    Bytes(u64),
    Time(SystemTime),
    Flag(bool),
}

/// Ordered mapping of metadata keys to values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(BTreeMap<AttributeKey, AttributeValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every attribute the platform reports for an entry
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let kind = if metadata.is_dir() {
            ItemKind::Directory
        } else {
            ItemKind::File
        };

        let mut attributes = Self::new()
            .with(AttributeKey::Kind, AttributeValue::Kind(kind))
            .with(AttributeKey::Size, AttributeValue::Bytes(metadata.len()))
            .with(
                AttributeKey::ReadOnly,
                AttributeValue::Flag(metadata.permissions().readonly()),
            );

        // Not every filesystem records creation time
        if let Ok(created) = metadata.created() {
            attributes.insert(AttributeKey::CreationDate, AttributeValue::Time(created));
        }
        if let Ok(modified) = metadata.modified() {
            attributes.insert(
                AttributeKey::ModificationDate,
                AttributeValue::Time(modified),
            );
        }

        attributes
    }

    pub fn with(mut self, key: AttributeKey, value: AttributeValue) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: AttributeKey, value: AttributeValue) {
        self.0.insert(key, value);
    }

    pub fn get(&self, key: AttributeKey) -> Option<&AttributeValue> {
        self.0.get(&key)
    }

    pub fn kind(&self) -> Option<ItemKind> {
        match self.get(AttributeKey::Kind)? {
            AttributeValue::Kind(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn size(&self) -> Option<u64> {
        match self.get(AttributeKey::Size)? {
            AttributeValue::Bytes(size) => Some(*size),
            _ => None,
        }
    }

    pub fn created(&self) -> Option<SystemTime> {
        self.time(AttributeKey::CreationDate)
    }

    pub fn modified(&self) -> Option<SystemTime> {
        self.time(AttributeKey::ModificationDate)
    }

    pub fn is_read_only(&self) -> Option<bool> {
        match self.get(AttributeKey::ReadOnly)? {
            AttributeValue::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    fn time(&self, key: AttributeKey) -> Option<SystemTime> {
        match self.get(key)? {
            AttributeValue::Time(time) => Some(*time),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AttributeKey, &AttributeValue)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_typed_accessors() {
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(42);
        let attributes = Attributes::new()
            .with(AttributeKey::Kind, AttributeValue::Kind(ItemKind::File))
            .with(AttributeKey::Size, AttributeValue::Bytes(1024))
            .with(AttributeKey::ModificationDate, AttributeValue::Time(modified));

        assert_eq!(attributes.kind(), Some(ItemKind::File));
        assert_eq!(attributes.size(), Some(1024));
        assert_eq!(attributes.modified(), Some(modified));
        assert_eq!(attributes.created(), None);
        assert_eq!(attributes.len(), 3);
    }

    #[test]
    fn test_mismatched_value_reads_as_none() {
        let attributes =
            Attributes::new().with(AttributeKey::Size, AttributeValue::Flag(true));
        assert_eq!(attributes.size(), None);
    }

    #[test]
    fn test_from_metadata() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("file.txt");
        fs::write(&path, "hello").unwrap();

        let attributes = Attributes::from_metadata(&fs::metadata(&path).unwrap());
        assert_eq!(attributes.kind(), Some(ItemKind::File));
        assert_eq!(attributes.size(), Some(5));
        assert!(attributes.modified().is_some());

        let attributes = Attributes::from_metadata(&fs::metadata(temp.path()).unwrap());
        assert_eq!(attributes.kind(), Some(ItemKind::Directory));
    }
}
