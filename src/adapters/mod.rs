// Adapters layer: table stores backed by local files, GitHub, or memory.

pub mod cached;
pub mod csv_codec;
pub mod github;
pub mod local;
pub mod memory;

pub use cached::CachedStore;
pub use github::{GitHubSettings, GitHubStore};
pub use local::LocalStore;
pub use memory::MemoryStore;
