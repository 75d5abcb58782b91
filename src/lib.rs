//! assistant-chat - a terminal chat client for hosted assistant threads
//!
//! This library exposes modules for use in integration tests and by the
//! `assistant-chat` binary.

pub mod adapters;
pub mod backend;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod functions;
pub mod logging;
pub mod meter;
pub mod models;
pub mod provider;
pub mod reconciler;
pub mod retry;
pub mod run;
pub mod server;
pub mod sse;
pub mod sync;
pub mod traits;
pub mod ui;
pub mod view;
