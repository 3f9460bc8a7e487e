pub mod config;
pub mod markup;
pub mod metrics;
pub mod probe;
pub mod reading;
pub mod rollover;
pub mod server;
