//! # Orion Server
//!
//! The HTTP surface of Orion. Every route is a thin adapter over a workflow
//! or a provider call; the routes themselves hold no state between
//! requests.
//!
//! ## Endpoints
//!
//! - `POST /auth/login` - Exchanges the configured credentials for a session token
//! - `POST /journal/save` - Saves a journal entry to Notion and/or memory, with a reflection
//! - `GET /journal/list` - Lists every journal page, newest first
//! - `POST /opportunity/{id}/evaluation` - Evaluates an opportunity against the profile
//! - `POST /memory/generate-embeddings` - Embeds a batch of texts
//! - `POST /memory/upsert` - Writes memory points
//! - `POST /memory/search` - Similarity search over memory
//! - `POST /habitica/tasks`, `/habitica/tasks/score`, `/habitica/todo` - Habitica proxy
//! - `POST /narrative/milestones/reorder` - Swaps a milestone with its neighbour
//! - `POST /cv/suggest`, `/cv/score` - CV tailoring heuristics
//! - `GET /health` - Health check endpoint
//! - `GET /metrics` - Prometheus metrics endpoint
//!
//! Everything except `/health`, `/metrics` and `/auth/login` requires a
//! session.

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ServerError};
pub use extract::ApiJson;
pub use server::OrionServer;
pub use state::{AppState, Collaborators};
