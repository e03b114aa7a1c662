//! REST API implementation for the meet server
//!
//! Routing and context live in `server`, request handlers in `handlers`,
//! the SSE endpoint in `sse`, and the judge PIN roster in `auth`.

pub mod auth;
pub mod handlers;
pub mod server;
pub mod sse;

pub use server::AppContext;
