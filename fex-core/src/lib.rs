pub mod broadcast;
pub mod config;
pub mod directory;
pub mod error;
pub mod file;
pub mod filter;
pub mod item;
pub mod service;
pub mod session;
pub mod size;
pub mod specification;

pub use broadcast::{RemovalBroadcast, Subscription};
pub use config::{ActionsConfiguration, Configuration, FilteringConfiguration};
pub use directory::{DirectoryContentViewModel, DirectoryEvent, SortMode};
pub use error::{FexError, Result};
pub use file::{FileAttributeRow, FileViewModel};
pub use filter::{Filter, FilterSet};
pub use item::{AttributeKey, AttributeValue, Attributes, Item, ItemKind, LoadedItem, Resource};
pub use service::{DeletionReport, FileService, LocalFileService, LocalStorage, Storage};
pub use session::{Command, Screen, ScreenId, Session, SessionEvent, root_item};
pub use size::{format_count, format_size};
pub use specification::{FileSpecification, FileSpecifications, PreviewKind};
