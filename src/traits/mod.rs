//! Trait abstractions at the transport seam.
//!
//! Every remote collaborator (assistant provider, thread registry, token
//! endpoints, function handler) talks through [`HttpClient`], so tests can
//! swap in [`crate::adapters::MockHttpClient`] without touching the network.

pub mod http;

pub use http::{ByteStream, Headers, HttpClient, HttpError, Response};
