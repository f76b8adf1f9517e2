pub mod api;
pub mod client;
pub mod errors;
pub mod types;

pub use api::Notifier;
pub use client::{TelegramConfig, TelegramNotifier};
pub use errors::NotifyError;
