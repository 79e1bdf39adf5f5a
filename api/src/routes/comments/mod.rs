pub mod comments_route;
