pub mod config;
pub mod domain;
pub mod handlers;
pub mod metrics;
pub mod notifier;
pub mod repo;
