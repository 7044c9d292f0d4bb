//! Network layer - HTTP request construction and execution

pub mod client;

pub use client::{build_request, Executor};
