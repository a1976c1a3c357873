//! Content entity: a lesson, quiz or assignment inside a section.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::UnknownVariant;

/// Kind of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Lesson,
    Quiz,
    Assignment,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Lesson => "lesson",
            ContentType::Quiz => "quiz",
            ContentType::Assignment => "assignment",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lesson" => Ok(ContentType::Lesson),
            "quiz" => Ok(ContentType::Quiz),
            "assignment" => Ok(ContentType::Assignment),
            other => Err(UnknownVariant::new("content type", other)),
        }
    }
}

/// A persisted content item.
///
/// `body` is free text (the `content` column).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: i64,
    pub section_id: i64,
    pub title: String,
    pub body: String,
    pub content_type: ContentType,
    pub order: i32,
    pub is_free: bool,
    pub video_url: Option<String>,
    pub duration_minutes: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input data for creating a content item.
#[derive(Debug, Clone, PartialEq)]
pub struct NewContent {
    pub section_id: i64,
    pub title: String,
    pub body: String,
    pub content_type: ContentType,
    pub order: i32,
    pub is_free: bool,
    pub video_url: Option<String>,
    pub duration_minutes: Option<i32>,
}

/// Partial update for a content item.
///
/// `None` leaves a field unchanged; `Some(None)` clears an optional column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContentPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub content_type: Option<ContentType>,
    pub order: Option<i32>,
    pub is_free: Option<bool>,
    pub video_url: Option<Option<String>>,
    pub duration_minutes: Option<Option<i32>>,
}

/// Accepts absolute `http` and `https` URLs only.
pub fn is_video_url(value: &str) -> bool {
    url::Url::parse(value).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_url_scheme() {
        assert!(is_video_url("https://videos.example.com/1"));
        assert!(is_video_url("http://example.com/v.mp4"));
        assert!(!is_video_url("ftp://example.com/v.mp4"));
        assert!(!is_video_url("not a url"));
    }

    #[test]
    fn test_content_type_parse() {
        assert_eq!("quiz".parse::<ContentType>().unwrap(), ContentType::Quiz);
        assert_eq!(ContentType::Assignment.to_string(), "assignment");

        let err = "video".parse::<ContentType>().unwrap_err();
        assert_eq!(err.value, "video");
    }

    #[test]
    fn test_content_type_serde_lowercase() {
        let json = serde_json::to_string(&ContentType::Lesson).unwrap();
        assert_eq!(json, "\"lesson\"");

        let parsed: ContentType = serde_json::from_str("\"assignment\"").unwrap();
        assert_eq!(parsed, ContentType::Assignment);
    }
}
