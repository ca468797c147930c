//! Anthropic Messages API inference backend.
//!
//! Sends a system prompt (optional) and a single user turn made of zero or
//! more base64 images followed by the prompt text, and returns the first text
//! block of the reply.
//!
//! # Example
//!
//! ```rust,no_run
//! use luthier_inference::anthropic::AnthropicBackend;
//! use luthier_core::{CompletionRequest, InferenceBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = AnthropicBackend::from_env().unwrap();
//!     let reply = backend
//!         .complete(CompletionRequest::new("Name a guitar brand.", 64))
//!         .await
//!         .unwrap();
//!     println!("{}", reply);
//! }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{AnthropicBackend, AnthropicConfig};
pub use error::{to_luthier_error, AnthropicErrorCode};
pub use types::*;
