//! Upstream provider adapters
//!
//! This module contains one adapter per upstream AI provider:
//!
//! - **lmstudio**: LM Studio via its OpenAI-compatible API
//! - **ollama**: Ollama via its native `/api/*` endpoints
//! - **gemini**: Google Gemini via the Generative Language API
//! - **openai_shared**: OpenAI wire structures used by LM Studio
//! - **http**: timed JSON client shared by every adapter
//!
//! ## Architecture
//!
//! ```text
//! http.rs                      <- one attempt, explicit timeout, error mapping
//!    |          |          |
//! lmstudio.rs  ollama.rs  gemini.rs   <- implement ProviderAdapter
//!    |
//! openai_shared/
//! ```

pub mod gemini;
pub mod http;
pub mod lmstudio;
pub mod ollama;
pub mod openai_shared;

pub use gemini::GeminiProvider;
pub use lmstudio::LMStudioProvider;
pub use ollama::OllamaProvider;
