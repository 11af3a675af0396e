//! Story prompt assembly.
//!
//! The prompt is a pure function of its inputs so that identical selections
//! always send byte-identical text to the generation service.

use crate::error::StoryRequestError;
use crate::models::{Character, Genre, Tone};

pub const CHARACTERS_HEADER: &str = "Characters:";

pub fn character_line(character: &Character) -> String {
    format!(
        "{}: {} ({})",
        character.name, character.description, character.personality
    )
}

pub fn assemble(characters: &[Character], genre: Option<Genre>, tone: Option<Tone>) -> String {
    let mut lines = Vec::with_capacity(characters.len() + 2);

    if !characters.is_empty() {
        lines.push(CHARACTERS_HEADER.to_string());
        lines.extend(characters.iter().map(character_line));
    }

    if let (Some(genre), Some(tone)) = (genre, tone) {
        lines.push(format!("This is a {genre} story in a {tone} tone."));
    }

    lines.join("\n")
}

/// Snapshot of everything a generation call needs, checked up front.
#[derive(Clone, Debug, PartialEq)]
pub struct StoryRequest {
    characters: Vec<Character>,
    genre: Genre,
    tone: Tone,
}

impl StoryRequest {
    pub fn new(
        characters: Vec<Character>,
        genre: Option<Genre>,
        tone: Option<Tone>,
    ) -> Result<Self, StoryRequestError> {
        if characters.is_empty() {
            return Err(StoryRequestError::NoCharacters);
        }
        let genre = genre.ok_or(StoryRequestError::MissingGenre)?;
        let tone = tone.ok_or(StoryRequestError::MissingTone)?;
        Ok(Self {
            characters,
            genre,
            tone,
        })
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn genre(&self) -> Genre {
        self.genre
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn prompt(&self) -> String {
        assemble(&self.characters, Some(self.genre), Some(self.tone))
    }
}
