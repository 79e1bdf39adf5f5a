pub mod chatbot;
pub mod comments;
pub mod generate;
pub mod owner_query;
pub mod questions;
pub mod responses;
pub mod root_route;
pub mod upvotes;
