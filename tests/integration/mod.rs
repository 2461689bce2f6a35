//! Integration tests for client profile resolution

mod config_integration;
mod prefetch_cache;
mod resolution_flow;
mod settings_store;
mod test_utils;
