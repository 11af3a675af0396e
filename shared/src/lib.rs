//! Character registry and story request assembly shared by the service and its clients.

pub mod error;
pub mod models;
pub mod persistence;
pub mod prompt;
pub mod session;
pub mod store;

pub use error::*;
pub use persistence::{BlobPersistence, BlobStore, CharacterPersistence, MemoryBlobStore};
pub use prompt::{StoryRequest, assemble};
pub use session::{EditSession, SessionState};
pub use store::{CharacterStore, Synced};
