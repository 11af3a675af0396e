use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type CharacterId = i64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub description: String,
    pub personality: String,
}

impl Character {
    /// Copy of the editable fields, used to seed an edit form.
    pub fn to_draft(&self) -> CharacterDraft {
        CharacterDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            personality: self.personality.clone(),
        }
    }
}

/// Unvalidated field values for a character, as typed into the form.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct CharacterDraft {
    pub name: String,
    pub description: String,
    pub personality: String,
}

impl CharacterDraft {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        personality: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            personality: personality.into(),
        }
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Description => &self.description,
            Field::Personality => &self.personality,
        }
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Description => &mut self.description,
            Field::Personality => &mut self.personality,
        };
        *slot = value.into();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Description,
    Personality,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Description, Field::Personality];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Description => "description",
            Field::Personality => "personality",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown character field: {s}"))
    }
}
