pub mod buffer_store;
pub mod code_extract;
pub mod notifier;

pub use buffer_store::{BufferStore, BUFFER_KEY};
pub use code_extract::extract_code_block;
pub use notifier::{CompositeNotifier, ConsoleNotifier, FileNotifier, Notifier, RecordingNotifier};
