//! HTTP API for the interactive web form.
//!
//! ## Endpoints
//!
//! - `GET /` - Single-page form (topic, temperature, generate button)
//! - `POST /api/generate` - Run the pipeline for a topic, return the article
//! - `GET /api/health` - Health check

mod routes;
mod types;

pub use routes::serve;
pub use types::*;
