//! HTTP transport for the Truth or Hoax game.
//!
//! [`routes::Router`] maps requests to core operations and is free of any I/O;
//! [`http::serve`] wires it to a hyper 1.x HTTP/1 listener.

pub mod api;
pub mod http;
pub mod routes;
pub mod session;

pub use http::{serve, serve_listener, MAX_BODY_BYTES};
pub use routes::{ApiRequest, ApiResponse, Router};
