use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One article from an `artlist` response. `content` is filled in later by the
/// content fetcher; an empty string means extraction failed or has not run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub url: String,
    #[serde(rename = "seendate", with = "seendate")]
    pub published_at: DateTime<Utc>,
    #[serde(rename = "sourcecountry")]
    pub source_country: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub content: String,
}

/// Supported `mode=` values for the DOC endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    ArtList,
}

impl QueryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ArtList => "artlist",
        }
    }
}

impl std::str::FromStr for QueryMode {
    type Err = crate::gdelt::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "artlist" => Ok(Self::ArtList),
            _ => Err(crate::gdelt::ValidationError::UnsupportedMode(s.to_string())),
        }
    }
}

/// `seendate` timestamps look like `20230101T120000Z`.
pub(crate) mod seendate {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub const FORMAT: &str = "%Y%m%dT%H%M%SZ";

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(D::Error::custom)
    }
}
