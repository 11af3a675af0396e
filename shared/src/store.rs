use crate::error::{StoreError, StoreResult, StoreSyncError, ValidationError};
use crate::models::{Character, CharacterDraft, CharacterId, Field};
use crate::persistence::CharacterPersistence;
use std::collections::HashSet;
use std::sync::Arc;

/// Result of an operation that also synced the durable copy.
///
/// A failed sync does not undo the in-memory change; it is only reported.
#[derive(Debug, Clone, PartialEq)]
pub struct Synced<T> {
    pub value: T,
    pub sync_error: Option<StoreSyncError>,
}

impl<T> Synced<T> {
    pub fn into_value(self) -> T {
        self.value
    }
}

/// Ordered, name-unique collection of characters backed by a durable store.
pub struct CharacterStore {
    characters: Vec<Character>,
    last_id: CharacterId,
    persistence: Arc<dyn CharacterPersistence>,
}

impl CharacterStore {
    /// Loads the persisted characters. Unreadable data, or data breaking the
    /// field, name or id rules, starts an empty store.
    pub async fn open(persistence: Arc<dyn CharacterPersistence>) -> Synced<Self> {
        let loaded = persistence
            .load()
            .await
            .and_then(|characters| check_loaded(&characters).map(|()| characters));
        let (characters, sync_error) = match loaded {
            Ok(characters) => (characters, None),
            Err(e) => {
                tracing::warn!("Starting with no characters: {}", e);
                (Vec::new(), Some(e))
            }
        };
        let last_id = characters.iter().map(|c| c.id).max().unwrap_or(0);
        tracing::info!("Loaded {} characters", characters.len());

        Synced {
            value: Self {
                characters,
                last_id,
                persistence,
            },
            sync_error,
        }
    }

    pub fn list(&self) -> &[Character] {
        &self.characters
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn get(&self, id: CharacterId) -> StoreResult<&Character> {
        self.characters
            .iter()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    /// Checks a draft against the field and uniqueness rules and returns it trimmed.
    ///
    /// `exclude` is the id of the character being edited, which may keep its own name.
    pub fn validate(
        &self,
        draft: &CharacterDraft,
        exclude: Option<CharacterId>,
    ) -> Result<CharacterDraft, ValidationError> {
        for field in Field::ALL {
            if draft.field(field).trim().is_empty() {
                return Err(ValidationError::EmptyField(field));
            }
        }

        let name = draft.name.trim();
        let wanted = name.to_lowercase();
        let taken = self
            .characters
            .iter()
            .any(|c| Some(c.id) != exclude && c.name.trim().to_lowercase() == wanted);
        if taken {
            return Err(ValidationError::DuplicateName(name.to_string()));
        }

        Ok(CharacterDraft::new(
            name,
            draft.description.trim(),
            draft.personality.trim(),
        ))
    }

    pub async fn create(&mut self, draft: CharacterDraft) -> StoreResult<Synced<Character>> {
        let draft = self.validate(&draft, None)?;
        let character = Character {
            id: self.next_id()?,
            name: draft.name,
            description: draft.description,
            personality: draft.personality,
        };
        self.characters.push(character.clone());
        tracing::info!("Created character {} ({})", character.id, character.name);

        let sync_error = self.sync().await;
        Ok(Synced {
            value: character,
            sync_error,
        })
    }

    pub async fn update(
        &mut self,
        id: CharacterId,
        draft: CharacterDraft,
    ) -> StoreResult<Synced<Character>> {
        self.get(id)?;
        let draft = self.validate(&draft, Some(id))?;

        let slot = self
            .characters
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound(id))?;
        slot.name = draft.name;
        slot.description = draft.description;
        slot.personality = draft.personality;
        let character = slot.clone();
        tracing::info!("Updated character {} ({})", character.id, character.name);

        let sync_error = self.sync().await;
        Ok(Synced {
            value: character,
            sync_error,
        })
    }

    pub async fn delete(&mut self, id: CharacterId) -> StoreResult<Synced<()>> {
        let index = self
            .characters
            .iter()
            .position(|c| c.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let removed = self.characters.remove(index);
        tracing::info!("Deleted character {} ({})", removed.id, removed.name);

        let sync_error = self.sync().await;
        Ok(Synced {
            value: (),
            sync_error,
        })
    }

    /// Time-based id, bumped past the last issued one if the clock has not moved on.
    fn next_id(&mut self) -> StoreResult<CharacterId> {
        let after_last = self
            .last_id
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted)?;
        let now = chrono::Utc::now().timestamp_millis();
        self.last_id = now.max(after_last);
        Ok(self.last_id)
    }

    async fn sync(&self) -> Option<StoreSyncError> {
        match self.persistence.save(&self.characters).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!("Character changes kept in memory only: {}", e);
                Some(e)
            }
        }
    }
}

fn check_loaded(characters: &[Character]) -> Result<(), StoreSyncError> {
    let mut ids = HashSet::with_capacity(characters.len());
    let mut names = HashSet::with_capacity(characters.len());
    for character in characters {
        let draft = character.to_draft();
        if let Some(field) = Field::ALL
            .into_iter()
            .find(|&field| draft.field(field).trim().is_empty())
        {
            return Err(StoreSyncError::Corrupt(format!(
                "character {} has an empty {}",
                character.id, field
            )));
        }
        if !ids.insert(character.id) {
            return Err(StoreSyncError::Corrupt(format!(
                "id {} is used more than once",
                character.id
            )));
        }
        if !names.insert(character.name.trim().to_lowercase()) {
            return Err(StoreSyncError::Corrupt(format!(
                "name \"{}\" is used more than once",
                character.name.trim()
            )));
        }
    }
    Ok(())
}
