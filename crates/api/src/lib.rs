//! HTTP boundary for the parts catalog.
//!
//! [`Route`] turns a method and request target into a catalog operation,
//! [`CatalogService`] runs it against a shared [`partcat_kernel::VersionedStore`]
//! and maps the outcome to a status code, and [`CatalogServer`] drives the
//! service from a pool of `tiny_http` worker threads.
//!
//! Status mapping: validation failures 400, unknown parts or versions 404,
//! conflict-policy refusals 409, storage failures 500.

pub mod config;
pub mod route;
pub mod server;
pub mod service;

pub use config::{ConfigError, CorsConfig, ServiceConfig};
pub use route::{Route, RouteError};
pub use server::{CatalogServer, ServerError, ShutdownHandle};
pub use service::{ApiRequest, ApiResponse, CatalogService};

pub fn crate_info() -> &'static str {
    "partcat-api v0.1.0"
}
