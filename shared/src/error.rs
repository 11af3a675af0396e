use crate::models::{CharacterId, Field};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(Field),
    #[error("A character named \"{0}\" already exists")]
    DuplicateName(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Character {0} not found")]
    NotFound(CharacterId),
    #[error("No character ids are left to assign")]
    IdsExhausted,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure to read or write the durable copy of the character list.
///
/// Never fatal: the in-memory collection stays authoritative for the session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreSyncError {
    #[error("Failed to read stored characters: {0}")]
    Read(String),
    #[error("Failed to write stored characters: {0}")]
    Write(String),
    #[error("Stored characters are corrupt: {0}")]
    Corrupt(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("A character form is already open")]
    AlreadyOpen,
    #[error("No character form is open")]
    NotOpen,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoryRequestError {
    #[error("Add at least one character before generating a story")]
    NoCharacters,
    #[error("Choose a genre before generating a story")]
    MissingGenre,
    #[error("Choose a tone before generating a story")]
    MissingTone,
}
