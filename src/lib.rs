//! # Campus Agents
//!
//! Role-specific assistants for Université Bordeaux Montaigne, served over
//! HTTP and backed by a single text-generation model.
//!
//! This library provides:
//! - An HTTP API with one endpoint per intent (`/infos`, `/salles`, ...)
//! - A static document store used to ground the general-information intent
//! - A generation client that serializes access to the model and reads the
//!   assistant reply by role
//!
//! ## Architecture
//!
//! Every intent request follows the same path:
//! 1. Pick the intent's fixed instruction (and reference documents, if any)
//! 2. Build a system + user conversation
//! 3. Call the model once, with a bounded timeout
//! 4. Return the reply and elapsed time, or a structured error
//!
//! ## Example
//!
//! ```rust,ignore
//! use campus_agents::{api, config::Config};
//!
//! let config = Config::from_env()?;
//! api::serve(config).await?;
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod documents;
pub mod llm;

pub use config::Config;
