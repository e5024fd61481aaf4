pub mod cache;
pub mod file;

mod macros;

pub use cache::ArtifactCache;
pub use cache::ArtifactKey;
pub use file::ArtifactStore;
pub use file::FileArtifactStore;
pub use file::StoreError;
