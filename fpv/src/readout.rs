use crate::device::Device;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};
use velocity::Snapshot;

/// One line of operator-facing state: telemetry plus the current command.
#[derive(Debug, Copy, Clone)]
pub struct Readout {
	pub battery: i32,
	pub altitude: i32,
	pub temperature_celsius: f32,
	pub wifi_snr: i32,
	pub velocity: Snapshot,
}

impl Display for Readout {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"Battery {}%, Height {} cm, Temperature {:.1}°C, WiFi SNR {} | {}",
			self.battery, self.altitude, self.temperature_celsius, self.wifi_snr, self.velocity
		)
	}
}

pub fn fahrenheit_to_celsius(degrees: f32) -> f32 {
	(degrees - 32.0) * 5.0 / 9.0
}

/// Rate-limited telemetry readout. Telemetry reads are slow-changing and
/// potentially expensive (the SNR is a blocking query), so they happen at
/// most once per wall-clock second regardless of the tick rate.
pub struct ReadoutMonitor {
	fahrenheit_source: bool,
	last_refresh_instant: Option<Instant>,
}

const REFRESH_PERIOD: Duration = Duration::from_secs(1);

impl ReadoutMonitor {
	pub fn new(fahrenheit_source: bool) -> Self {
		Self {
			fahrenheit_source,
			last_refresh_instant: None,
		}
	}

	pub fn refresh(&mut self, device: &mut dyn Device, velocity: Snapshot) {
		if let Some(instant) = self.last_refresh_instant {
			if instant.elapsed() < REFRESH_PERIOD {
				return;
			}
		}

		self.last_refresh_instant = Some(Instant::now());

		match device.telemetry() {
			Ok(telemetry) => {
				let temperature_celsius = if self.fahrenheit_source {
					fahrenheit_to_celsius(telemetry.temperature)
				} else {
					telemetry.temperature
				};

				let readout = Readout {
					battery: telemetry.battery,
					altitude: telemetry.altitude,
					temperature_celsius,
					wifi_snr: telemetry.wifi_snr,
					velocity,
				};

				info!(target: "readout", "{}", readout);
			}
			Err(e) => warn!("Telemetry read failed: {}", e),
		}
	}
}
