pub mod responses_route;
