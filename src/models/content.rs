use serde::{ Deserialize, Serialize };
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const ERROR_ITEM_ID: &str = "error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Joke,
    Dish,
}

impl ContentKind {
    pub const ALL: [ContentKind; 2] = [ContentKind::Joke, ContentKind::Dish];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Joke => "joke",
            ContentKind::Dish => "dish",
        }
    }

    /// Badge shown next to an item in the history list.
    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Joke => "Joke",
            ContentKind::Dish => "Dish",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            ContentKind::Joke => "Jokes",
            ContentKind::Dish => "Dishes",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseContentKindError {
    message: String,
}

impl fmt::Display for ParseContentKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseContentKindError {}

impl FromStr for ContentKind {
    type Err = ParseContentKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "joke" | "jokes" => Ok(ContentKind::Joke),
            "dish" | "dishes" => Ok(ContentKind::Dish),
            _ =>
                Err(ParseContentKindError {
                    message: format!("Invalid content kind: '{}'", s),
                }),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RatingError {
    #[error("rating {0} is outside 0.5..=5.0")]
    OutOfRange(f64),
    #[error("rating {0} is not a whole or half star")]
    NotHalfStep(f64),
}

/// Star score in half-star steps from 0.5 to 5.0.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Rating(f64);

impl Rating {
    pub const MIN: f64 = 0.5;
    pub const MAX: f64 = 5.0;

    pub fn new(value: f64) -> Result<Self, RatingError> {
        if !value.is_finite() || value < Self::MIN || value > Self::MAX {
            return Err(RatingError::OutOfRange(value));
        }
        if (value * 2.0).fract() != 0.0 {
            return Err(RatingError::NotHalfStep(value));
        }
        Ok(Self(value))
    }

    pub fn full_stars(&self) -> u8 {
        self.0.floor() as u8
    }

    pub fn has_half_star(&self) -> bool {
        self.0.fract() >= 0.5
    }
}

impl TryFrom<f64> for Rating {
    type Error = RatingError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for f64 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a generator hands back before the controller turns it into an item.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPayload {
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
}

/// A generated joke or dish.
///
/// Field names on the wire match the blob the browser build kept in local
/// storage (`type`, `content`, `timestamp`), so old histories load as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub title: String,
    #[serde(rename = "content")]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(rename = "timestamp")]
    pub created_at: i64,
}

impl ContentItem {
    pub fn from_payload(
        id: String,
        kind: ContentKind,
        payload: GeneratedPayload,
        created_at: i64
    ) -> Self {
        let image_url = match kind {
            ContentKind::Dish => payload.image_url,
            ContentKind::Joke => None,
        };
        Self {
            id,
            kind,
            title: payload.title,
            body: payload.body,
            image_url,
            rating: None,
            created_at,
        }
    }

    /// Placeholder shown when a generation could not be completed at all.
    pub fn error(kind: ContentKind, created_at: i64) -> Self {
        Self {
            id: ERROR_ITEM_ID.to_string(),
            kind,
            title: "Error".to_string(),
            body: format!("Oops! Couldn't fetch a {}. Try again later!", kind),
            image_url: None,
            rating: None,
            created_at,
        }
    }

    pub fn is_error(&self) -> bool {
        self.id == ERROR_ITEM_ID
    }
}
