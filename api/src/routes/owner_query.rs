use serde::Deserialize;

use crate::error_handler::{AppError, AppResult};

/// `?user_id=` filter of the `/my/...` routes.
///
/// A missing parameter is rejected by the `Query` extractor (400); a blank
/// one is rejected here with the same status.
#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub user_id: String,
}

impl OwnerQuery {
    pub fn user_id(&self) -> AppResult<&str> {
        let id = self.user_id.trim();
        if id.is_empty() {
            return Err(AppError::BadRequest("query parameter `user_id` must not be blank".into()));
        }
        Ok(id)
    }
}
