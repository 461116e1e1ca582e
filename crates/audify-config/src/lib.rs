#![forbid(unsafe_code)]
#![warn(
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

//! Environment-driven configuration for the Audify client.
//!
//! Layout: `defaults.rs` (endpoint and timing defaults), `model.rs` (typed
//! config), `validate.rs` (parsing helpers), `loader.rs` (`ConfigLoader`).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, env_keys};
pub use model::{ClientConfig, LinkPolicy, SpotifyConfig};
