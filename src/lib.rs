//! Simple push listener.
//!
//! A small HTTP service that accepts arbitrary JSON on `POST /receive_push`,
//! dumps it to the console and acknowledges the caller. `GET /` confirms the
//! service is alive.

pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod logger;
pub mod server;

pub use config::Config;
pub use error::{ListenerError, PushError, Result};
pub use logger::Console;
pub use server::{create_router, run};
