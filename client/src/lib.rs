//! A resolving [`wrap_core::Invoker`] built on the wrap resolvers.
//!
//! [`WrapClient`] owns a resolver stack assembled by [`ClientBuilder`],
//! optionally from a TOML [`ClientConfig`], and invokes whatever the stack
//! resolves to. [`plugin`] provides wrappers implemented directly in Rust.

#![deny(clippy::print_stdout, clippy::print_stderr)]

mod builder;
mod client;
pub mod config;
pub mod plugin;

pub use builder::ClientBuilder;
pub use client::WrapClient;
pub use config::CacheMode;
pub use config::ClientConfig;
pub use plugin::PluginModule;
pub use plugin::PluginPackage;
pub use plugin::PluginWrapper;
