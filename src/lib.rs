//! # jaqpot-mcp - Jaqpot tools over the Model Context Protocol
//!
//! Exposes prediction, model search and model metadata from the Jaqpot
//! modelling platform as MCP tools, so an LLM-driven agent can call them
//! without bespoke integration code.
//!
//! ## Architecture
//!
//! 1. **Backend** ([`ModelBackend`]): the authenticated Jaqpot API, built once
//!    at startup ([`JaqpotClient`]).
//! 2. **Registry** ([`ToolRegistry`]): the fixed tool catalog with parameter
//!    schemas, frozen after startup.
//! 3. **Dispatcher** ([`Dispatcher`]): resolves a call, checks its arguments,
//!    runs the handler and turns every failure into text.
//! 4. **Server** ([`JaqpotServer`]): the `rmcp` handler serving the
//!    dispatcher over stdio.
//!
//! Every call yields exactly one string. Failures are distinguished from
//! success only by their leading phrase (`Prediction failed:`,
//! `Search failed:`, `Unexpected error:` ...).
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use jaqpot_mcp::{Dispatcher, JaqpotClient, ServerConfig, ToolCallRequest};
//! use jaqpot_mcp::tools::jaqpot_registry;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::from_env()?;
//!     let client = JaqpotClient::from_config(&config)?;
//!     let dispatcher = Dispatcher::new(jaqpot_registry()?, Arc::new(client));
//!
//!     let text = dispatcher
//!         .dispatch(ToolCallRequest::new("get_model_info", json!({"model_id": 1})))
//!         .await;
//!     println!("{}", text);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod dispatcher;
pub mod handlers;
pub mod http;
pub mod jaqpot;
pub mod options;
pub mod outcome;
pub mod render;
pub mod server;
pub mod tools;

pub use backend::{BackendError, ModelBackend};
pub use config::{ConfigError, Credentials, ServerConfig};
pub use dispatcher::{Dispatcher, ToolCallRequest};
pub use jaqpot::JaqpotClient;
pub use outcome::{FailureKind, Operation, ToolOutcome};
pub use server::JaqpotServer;
pub use tools::{RegistryError, ToolDefinition, ToolError, ToolRegistry};

// Re-export rmcp for convenience
pub use rmcp;
