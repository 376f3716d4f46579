pub mod client;
pub mod error;
pub mod types;

pub use client::{Client, StatsSource};
pub use error::FetchError;
