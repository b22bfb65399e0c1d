pub mod client;
pub mod commands;
pub mod interface;
pub mod mock;
pub mod protocol;
pub mod transcript;

// Re-export the main types
pub use client::{ConnectionConfig, LockboxClient, LockboxClientBuilder};
pub use commands::Lockbox;
pub use interface::ScpiInterface;
pub use mock::{Exchange, RecordingInstrument};
pub use protocol::Protocol;
pub use transcript::{Direction, TranscriptEntry, TranscriptInterface};
