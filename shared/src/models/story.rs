use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ROLE_USER: &str = "user";
pub const ROLE_ASSISTANT: &str = "assistant";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Genre {
    Fantasy,
    Mystery,
    Romance,
    #[serde(rename = "Sci-Fi")]
    SciFi,
}

impl Genre {
    pub const ALL: [Genre; 4] = [Genre::Fantasy, Genre::Mystery, Genre::Romance, Genre::SciFi];

    pub fn as_str(self) -> &'static str {
        match self {
            Genre::Fantasy => "Fantasy",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::SciFi => "Sci-Fi",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Genre::Fantasy => "🧙",
            Genre::Mystery => "🕵️",
            Genre::Romance => "💑",
            Genre::SciFi => "🚀",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .into_iter()
            .find(|genre| genre.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown genre: {s}"))
    }
}

/// Accepts any casing, the same as `FromStr`.
impl<'de> Deserialize<'de> for Genre {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Tone {
    Happy,
    Sad,
    Sarcastic,
    Funny,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Happy, Tone::Sad, Tone::Sarcastic, Tone::Funny];

    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Happy => "Happy",
            Tone::Sad => "Sad",
            Tone::Sarcastic => "Sarcastic",
            Tone::Funny => "Funny",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Tone::Happy => "😊",
            Tone::Sad => "😢",
            Tone::Sarcastic => "😏",
            Tone::Funny => "😂",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tone::ALL
            .into_iter()
            .find(|tone| tone.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown tone: {s}"))
    }
}

impl<'de> Deserialize<'de> for Tone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// A selectable genre or tone, as offered to the UI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoryOption {
    pub value: String,
    pub emoji: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoryOptions {
    pub genres: Vec<StoryOption>,
    pub tones: Vec<StoryOption>,
}

impl Default for StoryOptions {
    fn default() -> Self {
        Self {
            genres: Genre::ALL
                .into_iter()
                .map(|g| StoryOption {
                    value: g.as_str().to_string(),
                    emoji: g.emoji().to_string(),
                })
                .collect(),
            tones: Tone::ALL
                .into_iter()
                .map(|t| StoryOption {
                    value: t.as_str().to_string(),
                    emoji: t.emoji().to_string(),
                })
                .collect(),
        }
    }
}

/// A prior conversation turn sent along with the prompt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// "user" or "assistant"
    pub role: String,
    pub content: String,
}

impl Turn {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct GenerateStoryRequest {
    #[serde(default)]
    pub genre: Option<Genre>,
    #[serde(default)]
    pub tone: Option<Tone>,
    #[serde(default)]
    pub history: Vec<Turn>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStatus {
    pub in_flight: bool,
    pub last_result: Option<GenerationResult>,
    pub last_error: Option<String>,
}
