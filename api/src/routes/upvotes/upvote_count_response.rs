use serde::Serialize;

/// Response payload for GET /responses/{id}/upvotes.
#[derive(Debug, Serialize)]
pub struct UpvoteCountResponse {
    pub count: usize,
}
