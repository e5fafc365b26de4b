//! Link to a Ryze Tello over its UDP text protocol.
//!
//! Three independent channels, matching the drone's SDK:
//! - commands and replies on `192.168.10.1:8889` ([`Commander`]),
//! - state telemetry pushed by the drone to local port 8890 ([`StateReceiver`]),
//! - the raw H.264 elementary stream on local port 11111 ([`VideoReceiver`]).
//!
//! The receivers own their socket and run on a dedicated thread, feeding a
//! `crossbeam_channel`; the consumer keeps the latest value. Decoding the
//! video stream is the consumer's concern.

#[macro_use]
extern crate log;

mod command;
mod state;
mod video;

pub use command::Commander;
pub use state::{State, StateReceiver};
pub use video::VideoReceiver;

/// Command/response endpoint of the drone on its own access point.
pub const COMMAND_ADDR: &'static str = "192.168.10.1:8889";

/// Local port the drone pushes `key:value;` state packets to.
pub const STATE_PORT: u16 = 8890;

/// Local port the drone streams video datagrams to once `streamon` is sent.
pub const VIDEO_PORT: u16 = 11111;
