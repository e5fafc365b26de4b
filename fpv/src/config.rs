use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::io::Write;

#[derive(Serialize, Deserialize, Clone)]
pub struct FpvConfig {
	pub log_level_filter: String,
	/// Control ticks per second; overridable with `--fps`.
	pub tick_rate_hz: u32,
	pub gain_step: i32,
	pub decay_step: i32,
	pub velocity_limit: i32,
	/// Window and expected frame geometry, pixels.
	pub frame_width: u32,
	pub frame_height: u32,
	/// Set when the telemetry source reports temperature in Fahrenheit; the
	/// readout then converts to Celsius. The Tello reports Celsius.
	pub temperature_fahrenheit: bool,
	pub command_addr: String,
	pub state_port: u16,
	pub video_port: u16,
	/// Window background, RGB.
	pub background: [u8; 3],
}

impl FpvConfig {
	/// Rejects values a hand-edited file can hold but the session cannot
	/// run with. Checked before the device connects, so a bad file is a
	/// clean startup error instead of a panic mid-session.
	pub fn validate(&self) -> Result<(), String> {
		if self.tick_rate_hz == 0 {
			return Err(String::from("tick_rate_hz must be strictly positive"));
		}

		if self.gain_step <= 0 || self.decay_step <= 0 || self.velocity_limit <= 0 {
			return Err(String::from(
				"gain_step, decay_step and velocity_limit must be strictly positive",
			));
		}

		if self.frame_width == 0 || self.frame_height == 0 {
			return Err(String::from("Frame geometry must be non-zero"));
		}

		Ok(())
	}
}

pub trait TryIntoLevelFilter {
	fn try_into_level_filter(&self) -> Result<LevelFilter, ()>;
}

impl TryIntoLevelFilter for String {
	fn try_into_level_filter(&self) -> Result<LevelFilter, ()> {
		Ok(match self.as_str() {
			"none" => LevelFilter::Off,
			"error" => LevelFilter::Error,
			"warn" => LevelFilter::Warn,
			"info" => LevelFilter::Info,
			"debug" => LevelFilter::Debug,
			"all" => LevelFilter::Trace,
			_ => return Err(()),
		})
	}
}

impl Default for FpvConfig {
	fn default() -> Self {
		FpvConfig {
			log_level_filter: String::from("info"),
			tick_rate_hz: 30,
			gain_step: velocity::DEFAULT_GAIN_STEP,
			decay_step: velocity::DEFAULT_DECAY_STEP,
			velocity_limit: velocity::DEFAULT_LIMIT,
			// Native geometry of the Tello stream.
			frame_width: 960,
			frame_height: 720,
			temperature_fahrenheit: false,
			command_addr: String::from(tello::COMMAND_ADDR),
			state_port: tello::STATE_PORT,
			video_port: tello::VIDEO_PORT,
			background: [17, 148, 218],
		}
	}
}

const CONFIG_FILE_PATH: &'static str = "fpv.json";

/// Reads the configuration file, creating it with defaults on first run.
pub fn read() -> Result<FpvConfig, Box<dyn Error>> {
	let config_file = match File::open(CONFIG_FILE_PATH) {
		Ok(file) => file,
		Err(ref e) if e.kind() == ErrorKind::NotFound => {
			let config = FpvConfig::default();
			save(&config)?;
			return Ok(config);
		}
		Err(e) => return Err(e.into()),
	};

	let config: FpvConfig = serde_json::from_reader(config_file)?;

	config.validate()?;

	Ok(config)
}

pub fn save(config: &FpvConfig) -> Result<(), Box<dyn Error>> {
	let mut config_file = OpenOptions::new()
		.create(true)
		.write(true)
		.truncate(true)
		.open(CONFIG_FILE_PATH)?;

	write!(config_file, "{}", serde_json::to_string_pretty(config)?)?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use crate::config::{FpvConfig, TryIntoLevelFilter};
	use log::LevelFilter;

	#[test]
	fn level_filter_strings() {
		assert_eq!(
			String::from("info").try_into_level_filter(),
			Ok(LevelFilter::Info)
		);
		assert_eq!(
			String::from("all").try_into_level_filter(),
			Ok(LevelFilter::Trace)
		);
		assert_eq!(String::from("verbose").try_into_level_filter(), Err(()));
	}

	#[test]
	fn default_validates() {
		assert_eq!(FpvConfig::default().validate(), Ok(()));
	}

	#[test]
	fn zero_tick_rate_is_rejected() {
		let mut config = FpvConfig::default();
		config.tick_rate_hz = 0;

		assert!(config.validate().is_err());
	}

	#[test]
	fn non_positive_steps_are_rejected() {
		let mut config = FpvConfig::default();
		config.decay_step = 0;
		assert!(config.validate().is_err());

		let mut config = FpvConfig::default();
		config.gain_step = -3;
		assert!(config.validate().is_err());

		let mut config = FpvConfig::default();
		config.velocity_limit = 0;
		assert!(config.validate().is_err());
	}

	#[test]
	fn zero_frame_geometry_is_rejected() {
		let mut config = FpvConfig::default();
		config.frame_height = 0;

		assert!(config.validate().is_err());
	}

	#[test]
	fn default_round_trips_through_json() {
		let serialized = serde_json::to_string(&FpvConfig::default()).unwrap();
		let config: FpvConfig = serde_json::from_str(&serialized).unwrap();

		assert_eq!(config.tick_rate_hz, 30);
		assert_eq!(config.gain_step, 3);
		assert_eq!(config.decay_step, 10);
		assert_eq!(config.velocity_limit, 100);
		assert!(!config.temperature_fahrenheit);
	}
}
