//! Proxy for the FatSecret food database.

pub mod client;
pub mod oauth;

pub use client::{classify_response, FoodSearchClient};
pub use oauth::OAuth1Signer;
