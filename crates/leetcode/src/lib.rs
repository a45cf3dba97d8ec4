//! Question source backed by the LeetCode GraphQL API.

pub mod client;
pub mod error;
pub mod queries;

pub use client::{LeetCodeClient, DEFAULT_GRAPHQL_URL};
pub use error::LeetCodeError;
