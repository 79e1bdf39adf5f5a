pub mod upvote_count_response;
pub mod upvotes_route;
