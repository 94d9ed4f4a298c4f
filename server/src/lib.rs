//! The request engine: target resolution, the tree cache, and every
//! request handler (spec §4.4–§4.6). Sits above `bridge-backend`'s platform
//! port and below the CLI's argument parsing and output formatting, the way
//! `accesskit_consumer` sits above the raw platform adapters.

pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod render;
pub mod resolve;
pub mod server;

pub use cache::TreeCache;
pub use config::BridgeConfig;
pub use error::{BridgeError, Candidate};
pub use handlers::envelope;
pub use render::SmartDefault;
pub use resolve::{resolve_target, ResolvedTarget};
pub use server::Server;
