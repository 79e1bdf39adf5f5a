//! Entities stored behind the resource API and the payloads used to create them.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{ResourceError, ResourceResult};

/// What kind of reply the asker hopes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Advice,
    JustListen,
    Encouragement,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Advice => "advice",
            Tone::JustListen => "just_listen",
            Tone::Encouragement => "encouragement",
        }
    }
}

/// One row exactly as the resource API returned it.
///
/// Reads hand rows back verbatim: unknown columns, nulls and the upstream
/// timestamp text all survive. Only the few accessors below interpret it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn id(&self) -> Option<&Value> {
        self.0.get("id")
    }

    /// `created_at` read as UTC. Accepts RFC 3339 and offset-less Postgres
    /// `timestamp` text; anything else is `None`.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.0.get("created_at")?.as_str()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
                    .ok()
                    .map(|t| t.and_utc())
            })
    }
}

/// A row of `questions`.
pub type Question = Record;
/// A row of `responses`: an answer posted under a question.
pub type Response = Record;
/// A row of `comments`.
pub type Comment = Record;
/// A row of `upvotes`. Duplicates are allowed.
pub type Upvote = Record;

/* ------------------------------------------------------------------------- */
/* Create payloads                                                           */
/* ------------------------------------------------------------------------- */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionCreate {
    pub user_id: String,
    pub content: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseCreate {
    pub question_id: String,
    pub user_id: String,
    pub content: String,
    #[serde(default)]
    pub is_emoji: bool,
}

/// Body of `POST /responses/{id}/comments`; the path id wins over `response_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentCreate {
    pub user_id: String,
    pub content: String,
    #[serde(default)]
    pub response_id: Option<String>,
}

/// Body of `POST /responses/{id}/upvote`; the path id wins over `response_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpvoteCreate {
    pub user_id: String,
    #[serde(default)]
    pub response_id: Option<String>,
}

/// Row actually inserted into `comments`.
#[derive(Debug, Serialize)]
pub(crate) struct NewComment<'a> {
    pub response_id: &'a str,
    pub user_id: &'a str,
    pub content: &'a str,
}

/// Row actually inserted into `upvotes`.
#[derive(Debug, Serialize)]
pub(crate) struct NewUpvote<'a> {
    pub response_id: &'a str,
    pub user_id: &'a str,
}

fn require(field: &'static str, value: &str) -> ResourceResult<()> {
    if value.trim().is_empty() {
        Err(ResourceError::Validation {
            field,
            reason: "must not be blank",
        })
    } else {
        Ok(())
    }
}

impl QuestionCreate {
    pub fn validate(&self) -> ResourceResult<()> {
        require("user_id", &self.user_id)?;
        require("content", &self.content)
    }
}

impl ResponseCreate {
    pub fn validate(&self) -> ResourceResult<()> {
        require("question_id", &self.question_id)?;
        require("user_id", &self.user_id)?;
        require("content", &self.content)
    }
}

impl CommentCreate {
    pub fn validate(&self) -> ResourceResult<()> {
        require("user_id", &self.user_id)?;
        require("content", &self.content)
    }
}

impl UpvoteCreate {
    pub fn validate(&self) -> ResourceResult<()> {
        require("user_id", &self.user_id)
    }
}

/* ------------------------------------------------------------------------- */
/* Create outcome                                                            */
/* ------------------------------------------------------------------------- */

/// Result of an insert: the stored row, or an acknowledgement when the
/// resource API accepted the insert without echoing it back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Created<T> {
    Record(T),
    Acknowledged { message: String, status_code: u16 },
}

impl<T> Created<T> {
    pub fn record(&self) -> Option<&T> {
        match self {
            Created::Record(r) => Some(r),
            Created::Acknowledged { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn tone_accepts_only_known_literals() {
        let ok: QuestionCreate = serde_json::from_value(json!({
            "user_id": "u1", "content": "hi", "tone": "just_listen"
        }))
        .unwrap();
        assert_eq!(ok.tone, Tone::JustListen);

        let bad = serde_json::from_value::<QuestionCreate>(json!({
            "user_id": "u1", "content": "hi", "tone": "angry"
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn rows_round_trip_verbatim() {
        let raw = json!({
            "id": "1b4e28ba-2fa1-11d2-883f-0016d3cca427",
            "question_id": 7, "user_id": "u", "content": "c",
            "is_emoji": null, "author_name": "Ana",
            "created_at": "2025-01-01T12:34:56.789012"
        });
        let row: Response = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&row).unwrap(), raw);
        assert_eq!(row.id(), Some(&json!("1b4e28ba-2fa1-11d2-883f-0016d3cca427")));
        assert_eq!(
            row.created_at().unwrap().to_rfc3339(),
            "2025-01-01T12:34:56.789012+00:00"
        );
    }

    #[test]
    fn created_at_reads_offsets_and_rejects_garbage() {
        let with_offset: Record =
            serde_json::from_value(json!({"created_at": "2025-03-01T10:00:00+02:00"})).unwrap();
        assert_eq!(
            with_offset.created_at().unwrap().to_rfc3339(),
            "2025-03-01T08:00:00+00:00"
        );

        let garbage: Record = serde_json::from_value(json!({"created_at": "yesterday"})).unwrap();
        assert!(garbage.created_at().is_none());
        assert!(Record::default().created_at().is_none());
    }

    #[test]
    fn blank_fields_fail_validation() {
        let dto = CommentCreate {
            user_id: "u".into(),
            content: "   ".into(),
            response_id: None,
        };
        assert!(matches!(
            dto.validate(),
            Err(ResourceError::Validation { field: "content", .. })
        ));
    }

    #[test]
    fn acknowledgement_serializes_flat() {
        let ack: Created<Upvote> = Created::Acknowledged {
            message: "Upvote created successfully".into(),
            status_code: 201,
        };
        assert_eq!(
            serde_json::to_value(&ack).unwrap(),
            json!({"message": "Upvote created successfully", "status_code": 201})
        );
    }
}
