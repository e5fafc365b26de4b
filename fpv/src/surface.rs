use crate::device::Frame;
use std::error::Error;

/// Discrete one-shot action, emitted on key release so holding a key never
/// repeats it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Action {
	TakeOff,
	Land,
	Emergency,
	Quit,
}

/// Held state of the eight direction keys, sampled once per tick.
#[derive(Debug, Copy, Clone, Default)]
pub struct HeldKeys {
	pub forward: bool,
	pub backward: bool,
	pub left: bool,
	pub right: bool,
	pub up: bool,
	pub down: bool,
	pub yaw_cw: bool,
	pub yaw_ccw: bool,
}

/// What the control loop needs from the operator-facing side: discrete
/// events, held-key state and a place to put frames. Implemented by the SDL
/// window; tests drive the loop with a scripted implementation.
pub trait ControlSurface {
	fn poll_actions(&mut self) -> Vec<Action>;

	fn held_keys(&self) -> HeldKeys;

	fn present(&mut self, frame: &Frame) -> Result<(), Box<dyn Error>>;
}
