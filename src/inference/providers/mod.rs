//! Chat-completions providers. Both speak the same OpenAI-compatible wire
//! format, defined once in [`chat`].

mod chat;
pub mod lmstudio;
pub mod openrouter;

pub use lmstudio::LmStudioProvider;
pub use openrouter::OpenRouterProvider;
