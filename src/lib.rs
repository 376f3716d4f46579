pub mod block;
pub mod config;
pub mod logging;
pub mod notifier;
pub mod pool_client;
pub mod stopper;
pub mod telegram_client;
pub mod test_utils;
