pub mod analytics;
pub mod comparison;
pub mod config;
pub mod output;
pub mod report;
pub mod responses;
pub mod server;
pub mod source;
pub mod stats;
