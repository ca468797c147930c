//! # luthier-inference
//!
//! LLM inference client and image loading for luthier.
//!
//! This crate provides:
//! - The Anthropic Messages API backend (text and vision)
//! - Error classification for upstream failures
//! - Photo loading: URL fetch or inline data URLs, base64-encoded
//! - A scripted mock backend (feature `mock`)
//!
//! # Feature Flags
//!
//! - `mock`: Enable [`mock::MockInferenceBackend`] for dependent crates' tests
//!
//! # Example
//!
//! ```rust,no_run
//! use luthier_inference::{AnthropicBackend, ImageLoader};
//! use luthier_core::{CompletionRequest, InferenceBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = AnthropicBackend::from_env().unwrap();
//!     let loader = ImageLoader::from_env().unwrap();
//!     let images = loader
//!         .load(&["https://example.com/guitar.jpg".to_string()], &[])
//!         .await;
//!     let reply = backend
//!         .complete(CompletionRequest::new("Describe the headstock.", 256).with_images(images))
//!         .await
//!         .unwrap();
//!     println!("{}", reply);
//! }
//! ```

pub mod anthropic;
pub mod images;

// Mock inference backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use anthropic::{AnthropicBackend, AnthropicConfig, AnthropicErrorCode};
pub use images::{parse_data_url, resolve_media_type, ImageLoader};
