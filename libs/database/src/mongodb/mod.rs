//! MongoDB connection management for the primary store.

mod config;
mod connector;

pub use config::MongoConfig;
pub use connector::{connect, connect_with_retry, ping};

pub use mongodb::{Client, Collection, Database};
