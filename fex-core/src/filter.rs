use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::item::{Item, ItemKind, extension_of};

/// Predicate over an entry's name, kind and modification time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum Filter {
    /// Case-insensitive extension match ("txt" matches "notes.TXT")
    Extension(String),
    Kind(ItemKind),
    /// Exact match on the last path component
    Name(String),
    /// Date variants compare at full `SystemTime` precision. Serialized
    /// values are truncated to whole seconds.
    ModifiedBefore(#[serde(with = "unix_seconds")] SystemTime),
    ModifiedAtOrBefore(#[serde(with = "unix_seconds")] SystemTime),
    ModifiedAfter(#[serde(with = "unix_seconds")] SystemTime),
    ModifiedAtOrAfter(#[serde(with = "unix_seconds")] SystemTime),
}

impl Filter {
    pub fn matches(&self, item: &Item) -> bool {
        self.matches_entry(&item.name(), item.kind(), item.modified())
    }

    pub fn matches_entry(&self, name: &str, kind: ItemKind, modified: SystemTime) -> bool {
        match self {
            Filter::Extension(extension) => {
                extension.to_lowercase() == extension_of(name).to_lowercase()
            }
            Filter::Kind(k) => *k == kind,
            Filter::Name(n) => n == name,
            Filter::ModifiedBefore(date) => modified < *date,
            Filter::ModifiedAtOrBefore(date) => modified <= *date,
            Filter::ModifiedAfter(date) => modified > *date,
            Filter::ModifiedAtOrAfter(date) => modified >= *date,
        }
    }
}

/// Union semantics over a collection of filters
pub trait FilterSet {
    /// True if any filter matches. An empty set matches nothing.
    fn any_matches(&self, item: &Item) -> bool;

    /// Include-filter semantics: an empty set lets everything through
    fn includes(&self, item: &Item) -> bool;

    /// Exclude-filter semantics: an empty set excludes nothing
    fn excludes(&self, item: &Item) -> bool {
        self.any_matches(item)
    }
}

impl FilterSet for [Filter] {
    fn any_matches(&self, item: &Item) -> bool {
        self.iter().any(|filter| filter.matches(item))
    }

    fn includes(&self, item: &Item) -> bool {
        self.is_empty() || self.any_matches(item)
    }
}

/// Serialize timestamps as whole seconds since the Unix epoch
pub(crate) mod unix_seconds {
    use std::time::{Duration, SystemTime};

    use serde::{Deserialize, Deserializer, Serializer, ser};

    pub fn serialize<S: Serializer>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error> {
        let secs = time
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_err(|_| <S::Error as ser::Error>::custom("timestamp predates the Unix epoch"))?
            .as_secs();
        serializer.serialize_u64(secs)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SystemTime, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }
}
