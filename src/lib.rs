pub mod error;
pub mod gain_sequence;
pub mod lockbox;
pub mod logger;
pub mod types;

pub use error::LockboxError;
pub use gain_sequence::{GainReadback, GainSequence, GainStep};
pub use lockbox::{
    ConnectionConfig, Direction, Exchange, Lockbox, LockboxClient, LockboxClientBuilder,
    RecordingInstrument, ScpiInterface, TranscriptEntry, TranscriptInterface,
};
pub use logger::Logger;
pub use types::{AnalogPin, InputChannel, OutputChannel, PidChannel, PidGain, Waveform};
