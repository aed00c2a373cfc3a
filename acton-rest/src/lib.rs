//! # acton-rest
//!
//! Capability-driven REST resources for axum.
//!
//! A [`Resource`](resource::Resource) describes one entity collection by the
//! functions that know how to find, list, search, create, change, and delete
//! it. Registering the resource exposes exactly the routes those functions
//! support, with every request passing through the same authorization
//! checkpoint before any collaborator function is called.
//!
//! ## Features
//!
//! - **Capability-driven routes**: optional functions decide which routes exist
//! - **Existence hiding**: a caller who may not act on a key cannot learn whether it exists
//! - **DTO boundary**: internal entities never reach the wire unconverted
//! - **Sub-entities**: read-only collections nested under an item
//! - **Server stack**: request IDs, timeouts, body limits, CORS, graceful shutdown
//!
//! ## Example
//!
//! ```rust,no_run
//! use acton_rest::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct Note {
//!     id: String,
//!     text: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let notes = Resource::<Note, Note>::builder("notes")
//!         .find(|_id| None)
//!         .find_all(Vec::new)
//!         .find_all_paged(|page| Page::empty(page, 20))
//!         .to_dto(Note::clone)
//!         .authorize(|ctx, action, _items| {
//!             action == Action::GetAll || ctx.header("x-role") == Some("editor")
//!         })
//!         .build()?;
//!
//!     let app = register(Router::new(), notes);
//!
//!     Server::new(config).serve(app).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod resource;
pub mod routes;
pub mod server;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, MiddlewareConfig, RequestTrackingConfig, ServiceConfig};
    pub use crate::context::RequestContext;
    pub use crate::error::{Error, Result};
    pub use crate::handlers::{ApiError, ApiErrorKind, ApiOperation, Page, DELETED};
    pub use crate::middleware::{
        request_id_layer, request_id_propagation_layer, sensitive_headers_layer, SENSITIVE_HEADERS,
    };
    pub use crate::observability::init_tracing;
    pub use crate::resource::{Action, Resource, ResourceBuilder, SubEntity};
    pub use crate::routes::{register, Operation, RouteSpec};
    pub use crate::server::Server;

    pub use axum::Router;
}
