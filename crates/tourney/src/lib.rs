//! Tournament desk: applications, divisions, fixtures, standings and schedules for youth
//! sports tournaments, over a pluggable keyed record store.

pub mod app;
pub mod config;
pub mod error;
mod http;
pub mod ids;
pub mod registry;
pub mod store;
pub mod telemetry;
pub mod workflows;

pub use app::{bootstrap, AppServices};
