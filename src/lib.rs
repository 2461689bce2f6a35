//! Persona: Client Profile Resolution
//!
//! Decides which client profile to present to a remote service for a piece of
//! content. The decision depends on liveness and playability metadata that is
//! fetched in the background through a single-slot prefetch cache, so callers
//! are never blocked longer than a bounded timeout.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod notify;
pub mod prefetch;
pub mod profile;
pub mod request;
pub mod resolver;
pub mod session;
pub mod settings;
pub mod speed;
pub mod types;
pub mod whitelist;
