//! Core types for prom2influx
//!
//! This crate contains the domain types shared by the source client, the
//! sink client and the transfer engine.

pub mod constants;
mod env_config;
mod error;
pub mod line_protocol;
mod point;
mod precision;
mod query;
mod retention;
mod spec;
mod window;

pub use env_config::*;
pub use error::*;
pub use point::*;
pub use precision::*;
pub use query::*;
pub use retention::*;
pub use spec::*;
pub use window::*;
