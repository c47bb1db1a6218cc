pub mod folder;
pub mod settings;

pub use folder::{Assignment, Folder, FolderId, ItemKey, ScopeKey};
pub use settings::Settings;
