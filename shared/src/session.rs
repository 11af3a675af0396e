use crate::error::SessionError;
use crate::models::{Character, CharacterDraft, CharacterId, Field};
use crate::store::{CharacterStore, Synced};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Closed,
    Creating,
    Editing(CharacterId),
}

/// The add/edit character form: which record is targeted and the staged values.
#[derive(Clone, Debug, Default)]
pub struct EditSession {
    state: SessionState,
    staged: CharacterDraft,
    last_error: Option<SessionError>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != SessionState::Closed
    }

    pub fn staged(&self) -> &CharacterDraft {
        &self.staged
    }

    /// Error from the last failed commit, cleared when the form closes.
    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    pub fn open_for_create(&mut self) -> Result<(), SessionError> {
        self.ensure_closed()?;
        self.state = SessionState::Creating;
        self.staged = CharacterDraft::default();
        Ok(())
    }

    pub fn open_for_edit(&mut self, character: &Character) -> Result<(), SessionError> {
        self.ensure_closed()?;
        self.state = SessionState::Editing(character.id);
        self.staged = character.to_draft();
        Ok(())
    }

    pub fn stage(&mut self, field: Field, value: impl Into<String>) -> Result<(), SessionError> {
        if !self.is_open() {
            return Err(SessionError::NotOpen);
        }
        self.staged.set_field(field, value);
        Ok(())
    }

    /// Validates and writes the staged values, closing the form on success.
    ///
    /// On failure the form stays open with the error available from [`Self::last_error`].
    pub async fn commit(
        &mut self,
        store: &mut CharacterStore,
    ) -> Result<Synced<Character>, SessionError> {
        let draft = self.staged.clone();
        let result = match self.state {
            SessionState::Closed => return Err(SessionError::NotOpen),
            SessionState::Creating => store.create(draft).await,
            SessionState::Editing(id) => store.update(id, draft).await,
        };

        match result {
            Ok(synced) => {
                self.close();
                Ok(synced)
            }
            Err(e) => {
                let err = SessionError::Store(e);
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub fn cancel(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.state = SessionState::Closed;
        self.staged = CharacterDraft::default();
        self.last_error = None;
    }

    fn ensure_closed(&self) -> Result<(), SessionError> {
        if self.is_open() {
            Err(SessionError::AlreadyOpen)
        } else {
            Ok(())
        }
    }
}
