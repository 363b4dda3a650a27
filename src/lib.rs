pub mod config;
pub mod error;
pub mod fetcher;
pub mod pipeline;
pub mod reshape;
pub mod types;
pub mod user_agent;
pub mod writer;
