//! OpenAI-compatible API access: chat completion and model listing.

pub mod client;
pub mod config;
pub mod models;

pub use client::{OpenAiClient, verify_configuration};
pub use config::{ClientConfig, DEFAULT_HOST};
pub use models::ModelInfo;
