use crate::device::{Device, Frame, Telemetry};
use std::error::Error;
use std::time::Instant;
use velocity::Snapshot;

/// Flightless stand-in for bench development away from the aircraft: frames
/// are a synthetic animated pattern, telemetry is canned and every command
/// is logged instead of sent. Never fails.
pub struct BenchDevice {
	width: u32,
	height: u32,
	frame_index: u64,
	start_instant: Instant,
}

impl BenchDevice {
	pub fn new(width: u32, height: u32) -> Self {
		info!("Bench device, {}x{}, commands are logged only", width, height);

		Self {
			width,
			height,
			frame_index: 0,
			start_instant: Instant::now(),
		}
	}
}

impl Device for BenchDevice {
	fn telemetry(&mut self) -> Result<Telemetry, Box<dyn Error>> {
		// Drains one percent per minute so the readout visibly changes.
		let battery = 100 - (self.start_instant.elapsed().as_secs() / 60) as i32;

		Ok(Telemetry {
			battery: battery.max(0),
			altitude: 0,
			temperature: 21.0,
			wifi_snr: 90,
		})
	}

	fn read_frame(&mut self) -> Result<Option<Frame>, Box<dyn Error>> {
		let mut frame = Frame::new(self.width, self.height);

		let shift = (self.frame_index * 2) as u32;

		for y in 0..self.height {
			let row = (y * self.width * 3) as usize;

			for x in 0..self.width {
				let offset = row + (x * 3) as usize;

				frame.rgb[offset] = (x * 255 / self.width) as u8;
				frame.rgb[offset + 1] = (y * 255 / self.height) as u8;
				frame.rgb[offset + 2] = ((x + y + shift) % 256) as u8;
			}
		}

		self.frame_index += 1;

		Ok(Some(frame))
	}

	fn send_velocity(&mut self, snapshot: &Snapshot) -> Result<(), Box<dyn Error>> {
		debug!(target: "bench", "rc {}", snapshot);
		Ok(())
	}

	fn take_off(&mut self) -> Result<(), Box<dyn Error>> {
		info!(target: "bench", "takeoff");
		Ok(())
	}

	fn land(&mut self) -> Result<(), Box<dyn Error>> {
		info!(target: "bench", "land");
		Ok(())
	}

	fn emergency(&mut self) -> Result<(), Box<dyn Error>> {
		info!(target: "bench", "emergency");
		Ok(())
	}

	fn release(&mut self) {
		info!(target: "bench", "released after {} frames", self.frame_index);
	}
}
