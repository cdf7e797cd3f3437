pub mod backend;
pub mod catalog;
pub mod channel;
pub mod config;
pub mod domain;
pub mod error;
pub mod i18n;
pub mod intent;
pub mod router;
pub mod service;
pub mod session;
pub mod types;
pub mod util;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
