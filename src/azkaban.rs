//! Client for the Azkaban web server's AJAX API.
pub mod client;
pub mod request;
pub mod types;
