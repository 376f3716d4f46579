pub mod client;
pub mod error;
pub mod types;

pub use client::{Client, Messenger};
pub use error::Error;
