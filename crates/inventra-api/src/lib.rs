// inventra-api: Async HTTP client for the Inventra inventory API

pub mod error;
pub mod models;
pub mod token;
pub mod transport;

mod analytics;
mod assets;
mod auth;
mod client;
mod products;

pub use client::ApiClient;
pub use error::Error;
pub use token::TokenCell;
pub use transport::{TlsMode, TransportConfig};
