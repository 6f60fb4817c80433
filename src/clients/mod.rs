pub mod gemini_client;
pub mod process_client;

pub use gemini_client::GeminiClient;
pub use process_client::{ProcessClient, ProcessEndpoint};
