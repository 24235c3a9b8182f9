pub mod anthropic;
pub mod gemini;
pub mod scripted;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use scripted::ScriptedProvider;
