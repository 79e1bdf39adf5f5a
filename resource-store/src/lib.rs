//! Typed access to the questions/responses/comments/upvotes resource API.

pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod query;

pub use client::{ResourceClient, TRENDING_LIMIT};
pub use config::ResourceConfig;
pub use errors::{ResourceConfigError, ResourceError, ResourceResult};
pub use models::{
    Comment, CommentCreate, Created, Question, QuestionCreate, Record, Response, ResponseCreate,
    Tone, Upvote, UpvoteCreate,
};
