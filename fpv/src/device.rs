use std::error::Error;
use velocity::Snapshot;

/// Point-in-time telemetry of the device. `temperature` is in the source's
/// native unit; conversion for display is the readout's concern.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Telemetry {
	pub battery: i32,
	pub altitude: i32,
	pub temperature: f32,
	pub wifi_snr: i32,
}

/// A decoded RGB24 frame, `width * height * 3` bytes, row major.
#[derive(Debug, Clone)]
pub struct Frame {
	pub width: u32,
	pub height: u32,
	pub rgb: Vec<u8>,
}

impl Frame {
	pub fn new(width: u32, height: u32) -> Self {
		Self {
			width,
			height,
			rgb: vec![0; (width * height * 3) as usize],
		}
	}
}

/// The remote aircraft (or its bench stand-in): frame source, telemetry
/// source and command sink behind one interface, selected at startup.
///
/// Everything here is synchronous and best effort. `read_frame` returns
/// `Ok(None)` when no new frame arrived since the last call; the caller
/// keeps presenting the previous one.
pub trait Device {
	fn telemetry(&mut self) -> Result<Telemetry, Box<dyn Error>>;

	fn read_frame(&mut self) -> Result<Option<Frame>, Box<dyn Error>>;

	/// Flushes the current velocity command. Called once per control tick
	/// whether or not the values changed: the link is fire and forget and
	/// the device falls back to hovering when commands stop arriving.
	fn send_velocity(&mut self, snapshot: &Snapshot) -> Result<(), Box<dyn Error>>;

	fn take_off(&mut self) -> Result<(), Box<dyn Error>>;

	fn land(&mut self) -> Result<(), Box<dyn Error>>;

	fn emergency(&mut self) -> Result<(), Box<dyn Error>>;

	/// Best-effort teardown; never fails, secondary errors are logged by the
	/// implementation.
	fn release(&mut self);
}
