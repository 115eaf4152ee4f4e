pub mod api;
pub mod config;
pub mod feed;
pub mod http_client;
pub mod labels;
pub mod poller;
pub mod state;
pub mod wiring;
