//! Natural-language event extraction via an external chat-completions API.

mod client;
mod types;

pub use client::LlmEventExtractor;
