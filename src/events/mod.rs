//! # Events Module
//!
//! Event-driven progress reporting from the core engine to any front end.
//!
//! The core never draws progress itself; it sends typed events over a
//! channel and whoever holds the receiver (CLI progress bar, GUI, nothing
//! at all) decides what to show.

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::{
    Event, GroupEvent, HashEvent, HashProgress, PipelineEvent, PipelinePhase, PipelineSummary,
    ScanEvent, ScanProgress,
};
