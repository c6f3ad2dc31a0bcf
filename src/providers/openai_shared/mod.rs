//! Shared OpenAI-compatible API structures
//!
//! LM Studio exposes the OpenAI wire format, so its adapter speaks these
//! types. Any future OpenAI-compatible server can reuse them.

pub mod types;

pub use types::*;
