//! TMDB metadata gateway: resource keys, HTTP client, and the cached,
//! rate-limited composition of the two.

pub mod client;
pub mod gateway;
pub mod resource;

pub use client::{HttpTmdbClient, TmdbClient, UpstreamRequest};
pub use gateway::{empty_page, placeholder, FailurePolicy, TmdbGateway};
pub use resource::TmdbResource;
