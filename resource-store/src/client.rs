//! HTTP client for the resource API (REST facade over the managed database).
//!
//! Endpoints used:
//!   * GET  /questions?...   * POST /questions
//!   * GET  /responses?...   * POST /responses
//!   * GET  /comments?...    * POST /comments
//!   * GET  /upvotes?...     * POST /upvotes
//!
//! Every operation is exactly one request. Non-2xx replies are returned as
//! [`ResourceError::Upstream`] carrying the upstream body verbatim.

use std::{cmp::Reverse, time::Duration};

use reqwest::{Client, StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, error, instrument};

use crate::{
    config::ResourceConfig,
    errors::{ResourceConfigError, ResourceError, ResourceResult},
    models::{
        Comment, CommentCreate, Created, NewComment, NewUpvote, Question, QuestionCreate,
        Response, ResponseCreate, Upvote, UpvoteCreate,
    },
    query::{Order, TableQuery},
};

/// Maximum number of rows returned by [`ResourceClient::trending_responses`].
pub const TRENDING_LIMIT: usize = 10;

/// Resource API client wrapper.
///
/// Cheap to clone; the inner `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    http: Client,
    base_api: String, // e.g. "https://xyz.supabase.co/rest/v1"
}

impl ResourceClient {
    /// Builds a client with the service credential baked into default headers.
    ///
    /// # Errors
    /// - [`ResourceConfigError::InvalidCredential`] if the key is not a valid header value
    /// - [`ResourceConfigError::Client`] if the HTTP client cannot be built
    pub fn new(cfg: &ResourceConfig) -> ResourceResult<Self> {
        let key = header::HeaderValue::from_str(&cfg.service_key)
            .map_err(|_| ResourceConfigError::InvalidCredential)?;
        let bearer = header::HeaderValue::from_str(&format!("Bearer {}", cfg.service_key))
            .map_err(|_| ResourceConfigError::InvalidCredential)?;

        let mut headers = header::HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(header::AUTHORIZATION, bearer);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| ResourceConfigError::Client(e.to_string()))?;

        let base_api = cfg.rest_base();
        debug!(base_api = %base_api, timeout_secs = cfg.timeout_secs, "ResourceClient initialized");

        Ok(Self { http, base_api })
    }

    /* --------------------------- questions --------------------------- */

    pub async fn list_questions(&self) -> ResourceResult<Vec<Question>> {
        self.fetch(TableQuery::table("questions").select_all())
            .await
    }

    /// Returns `None` when no row has this id.
    pub async fn get_question(&self, id: &str) -> ResourceResult<Option<Question>> {
        let rows: Vec<Question> = self
            .fetch(TableQuery::table("questions").eq("id", id).select_all())
            .await?;
        Ok(rows.into_iter().next())
    }

    pub async fn list_questions_by_user(&self, user_id: &str) -> ResourceResult<Vec<Question>> {
        self.fetch(
            TableQuery::table("questions")
                .eq("user_id", user_id)
                .select_all(),
        )
        .await
    }

    pub async fn create_question(&self, dto: &QuestionCreate) -> ResourceResult<Created<Question>> {
        dto.validate()?;
        self.insert("questions", dto, "Question").await
    }

    /* --------------------------- responses --------------------------- */

    pub async fn create_response(&self, dto: &ResponseCreate) -> ResourceResult<Created<Response>> {
        dto.validate()?;
        self.insert("responses", dto, "Response").await
    }

    pub async fn list_responses_for_question(
        &self,
        question_id: &str,
    ) -> ResourceResult<Vec<Response>> {
        self.fetch(
            TableQuery::table("responses")
                .eq("question_id", question_id)
                .select_all(),
        )
        .await
    }

    /// Returns `None` when no row has this id.
    pub async fn get_response(&self, id: &str) -> ResourceResult<Option<Response>> {
        let rows: Vec<Response> = self
            .fetch(TableQuery::table("responses").eq("id", id).select_all())
            .await?;
        Ok(rows.into_iter().next())
    }

    pub async fn list_responses_by_user(&self, user_id: &str) -> ResourceResult<Vec<Response>> {
        self.fetch(
            TableQuery::table("responses")
                .eq("user_id", user_id)
                .select_all(),
        )
        .await
    }

    /// Most recently created responses, newest first, at most [`TRENDING_LIMIT`].
    pub async fn trending_responses(&self) -> ResourceResult<Vec<Response>> {
        let mut rows: Vec<Response> = self
            .fetch(
                TableQuery::table("responses")
                    .select_all()
                    .order("created_at", Order::Desc)
                    .limit(TRENDING_LIMIT),
            )
            .await?;

        // Rows without a timestamp sort last; the sort is stable.
        rows.sort_by_key(|r| Reverse(r.created_at()));
        rows.truncate(TRENDING_LIMIT);
        Ok(rows)
    }

    /* ---------------------------- upvotes ---------------------------- */

    pub async fn create_upvote(
        &self,
        response_id: &str,
        dto: &UpvoteCreate,
    ) -> ResourceResult<Created<Upvote>> {
        dto.validate()?;
        let row = NewUpvote {
            response_id,
            user_id: &dto.user_id,
        };
        self.insert("upvotes", &row, "Upvote").await
    }

    /// Number of upvote rows for a response; duplicates are counted.
    pub async fn count_upvotes(&self, response_id: &str) -> ResourceResult<usize> {
        let rows: Vec<serde::de::IgnoredAny> = self
            .fetch(
                TableQuery::table("upvotes")
                    .eq("response_id", response_id)
                    .select_all(),
            )
            .await?;
        Ok(rows.len())
    }

    /* ---------------------------- comments --------------------------- */

    pub async fn create_comment(
        &self,
        response_id: &str,
        dto: &CommentCreate,
    ) -> ResourceResult<Created<Comment>> {
        dto.validate()?;
        let row = NewComment {
            response_id,
            user_id: &dto.user_id,
            content: &dto.content,
        };
        self.insert("comments", &row, "Comment").await
    }

    /// Comments under a response, oldest first.
    pub async fn list_comments(&self, response_id: &str) -> ResourceResult<Vec<Comment>> {
        self.fetch(
            TableQuery::table("comments")
                .eq("response_id", response_id)
                .select_all()
                .order("created_at", Order::Asc),
        )
        .await
    }

    /* --------------------------- internals --------------------------- */

    #[instrument(skip_all, fields(table = query.table_name()))]
    async fn fetch<T: DeserializeOwned>(&self, query: TableQuery) -> ResourceResult<Vec<T>> {
        let url = format!("{}/{}", self.base_api, query.to_path());
        debug!("GET {}", url);

        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            error!(%status, %body, "resource api read failed");
            return Err(ResourceError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    #[instrument(skip_all, fields(table = table))]
    async fn insert<B, T>(
        &self,
        table: &'static str,
        body: &B,
        entity: &'static str,
    ) -> ResourceResult<Created<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_api, table);
        debug!("POST {}", url);

        let resp = self
            .http
            .post(&url)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;
        debug!(%status, body_len = text.len(), "resource api insert answered");

        if !matches!(status, StatusCode::OK | StatusCode::CREATED) {
            error!(%status, body = %text, "resource api insert failed");
            return Err(ResourceError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        let ack = || Created::Acknowledged {
            message: format!("{entity} created successfully"),
            status_code: status.as_u16(),
        };

        if text.trim().is_empty() {
            return Ok(ack());
        }

        // The representation is normally a one-element array.
        let value: serde_json::Value = serde_json::from_str(&text)?;
        let first = match value {
            serde_json::Value::Array(items) => items.into_iter().next(),
            serde_json::Value::Null => None,
            other => Some(other),
        };

        match first {
            Some(row) => Ok(Created::Record(serde_json::from_value(row)?)),
            None => Ok(ack()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::models::Tone;

    fn client_for(server: &MockServer) -> ResourceClient {
        ResourceClient::new(&ResourceConfig {
            base_url: server.uri(),
            service_key: "service-key".into(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn response_row(id: i64, created_at: &str) -> serde_json::Value {
        json!({
            "id": id, "question_id": 1, "user_id": "u1",
            "content": format!("reply {id}"), "is_emoji": false,
            "created_at": created_at
        })
    }

    #[tokio::test]
    async fn reads_send_credentials_and_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/responses"))
            .and(query_param("question_id", "eq.1"))
            .and(query_param("select", "*"))
            .and(header("apikey", "service-key"))
            .and(header("authorization", "Bearer service-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([response_row(3, "2025-01-01T00:00:00Z")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let rows = client_for(&server)
            .list_responses_for_question("1")
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id(), Some(&json!(3)));
    }

    #[tokio::test]
    async fn listings_keep_rows_verbatim() {
        let server = MockServer::start().await;
        let responses = json!([
            {"id": 1, "question_id": 9, "user_id": "u1", "content": "hug",
             "is_emoji": null, "created_at": "2025-01-01T12:34:56.789012"},
            {"id": 2, "question_id": 9, "user_id": "u2", "content": "same",
             "is_emoji": true, "mood": "warm", "created_at": "2025-01-02T00:00:00+00:00"}
        ]);
        let comments = json!([
            {"id": 1, "response_id": 4, "user_id": "u1", "content": "thanks",
             "author_name": "Ana", "created_at": "2025-01-01T00:00:00+00:00"}
        ]);
        Mock::given(method("GET"))
            .and(path("/rest/v1/responses"))
            .and(query_param("question_id", "eq.9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(responses.clone()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/comments"))
            .and(query_param("response_id", "eq.4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(comments.clone()))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let rows = client.list_responses_for_question("9").await.unwrap();
        assert_eq!(serde_json::to_value(&rows).unwrap(), responses);

        let rows = client.list_comments("4").await.unwrap();
        assert_eq!(serde_json::to_value(&rows).unwrap(), comments);
    }

    #[tokio::test]
    async fn get_by_id_with_no_rows_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/responses"))
            .and(query_param("id", "eq.999"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        assert!(client_for(&server).get_response("999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_returns_first_row_of_representation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/questions"))
            .and(header("prefer", "return=representation"))
            .and(body_json(json!({"user_id": "u1", "content": "hello", "tone": "advice"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
                "id": 11, "user_id": "u1", "content": "hello", "tone": "advice"
            }])))
            .mount(&server)
            .await;

        let dto = QuestionCreate {
            user_id: "u1".into(),
            content: "hello".into(),
            tone: Tone::Advice,
        };
        let created = client_for(&server).create_question(&dto).await.unwrap();
        assert_eq!(created.record().unwrap().id(), Some(&json!(11)));
    }

    #[tokio::test]
    async fn create_with_empty_body_is_acknowledged() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/upvotes"))
            .and(body_json(json!({"response_id": "5", "user_id": "u2"})))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let dto = UpvoteCreate {
            user_id: "u2".into(),
            response_id: Some("ignored".into()),
        };
        let created = client_for(&server).create_upvote("5", &dto).await.unwrap();
        assert_eq!(
            created,
            Created::Acknowledged {
                message: "Upvote created successfully".into(),
                status_code: 201
            }
        );
    }

    #[tokio::test]
    async fn upstream_failure_keeps_body_verbatim() {
        let server = MockServer::start().await;
        let upstream = r#"{"code":"23503","message":"violates foreign key constraint"}"#;
        Mock::given(method("POST"))
            .and(path("/rest/v1/comments"))
            .respond_with(ResponseTemplate::new(409).set_body_string(upstream))
            .mount(&server)
            .await;

        let dto = CommentCreate {
            user_id: "u1".into(),
            content: "nice".into(),
            response_id: None,
        };
        let err = client_for(&server)
            .create_comment("77", &dto)
            .await
            .unwrap_err();
        match err {
            ResourceError::Upstream { status, body } => {
                assert_eq!(status, 409);
                assert_eq!(body, upstream);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn read_failure_is_an_error_not_an_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/questions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_questions().await.unwrap_err();
        assert!(matches!(err, ResourceError::Upstream { status: 500, .. }));
    }

    #[tokio::test]
    async fn invalid_payload_never_reaches_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let dto = ResponseCreate {
            question_id: "1".into(),
            user_id: " ".into(),
            content: "hi".into(),
            is_emoji: false,
        };
        let err = client_for(&server).create_response(&dto).await.unwrap_err();
        assert!(matches!(
            err,
            ResourceError::Validation {
                field: "user_id",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn trending_is_capped_and_newest_first() {
        let server = MockServer::start().await;
        let mut rows: Vec<_> = (1..=12)
            .map(|i| response_row(i, &format!("2025-01-{i:02}T00:00:00Z")))
            .collect();
        rows.swap(0, 5);
        Mock::given(method("GET"))
            .and(path("/rest/v1/responses"))
            .and(query_param("order", "created_at.desc"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(rows)))
            .mount(&server)
            .await;

        let out = client_for(&server).trending_responses().await.unwrap();
        assert_eq!(out.len(), TRENDING_LIMIT);
        assert_eq!(out[0].id(), Some(&json!(12)));
        assert!(out.windows(2).all(|w| w[0].created_at() >= w[1].created_at()));
    }

    #[tokio::test]
    async fn upvote_count_includes_duplicates() {
        let server = MockServer::start().await;
        let same_user = json!({"id": 1, "response_id": 4, "user_id": "u1"});
        Mock::given(method("GET"))
            .and(path("/rest/v1/upvotes"))
            .and(query_param("response_id", "eq.4"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([same_user, same_user, same_user])),
            )
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).count_upvotes("4").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn comments_are_requested_oldest_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/comments"))
            .and(query_param("response_id", "eq.4"))
            .and(query_param("order", "created_at.asc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        assert!(client_for(&server).list_comments("4").await.unwrap().is_empty());
    }
}
