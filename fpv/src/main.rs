#[macro_use]
extern crate anyhow;

#[macro_use]
extern crate log;

use crate::app::App;
use crate::config::TryIntoLevelFilter;
use crate::device::Device;
use crate::devices::bench::BenchDevice;
use crate::devices::tello_device::TelloDevice;
use crate::screen::Screen;
use flight_log::FlightLog;
use std::error::Error;

mod app;
mod clock;
mod config;
mod device;
mod devices;
mod mapper;
mod readout;
mod screen;
mod surface;

fn main() -> Result<(), Box<dyn Error>> {
	std::env::set_var("RUST_BACKTRACE", "full");

	// Command line arguments
	const DEVICE_ARG: &'static str = "device";
	const FPS_ARG: &'static str = "fps";

	let args = clap::Command::new("fpv")
		.version(env!("CARGO_PKG_VERSION"))
		.author("Vincent Leporcher <vincent.leporcher@telecom-paris.fr>")
		.arg(
			clap::Arg::new(DEVICE_ARG)
				.long("device")
				.help("Device backend: \"tello\" for the aircraft, \"bench\" for the stand-in")
				.takes_value(true)
				.default_value("tello"),
		)
		.arg(
			clap::Arg::new(FPS_ARG)
				.long("fps")
				.help("Control tick rate in Hz, overrides the configuration file")
				.takes_value(true),
		)
		.get_matches();

	// Configuration
	let mut config = config::read()?;

	if let Some(fps) = args.get_one::<String>(FPS_ARG) {
		config.tick_rate_hz = fps
			.parse()
			.map_err(|_| anyhow!("Invalid tick rate \"{}\"", fps))?;
	}

	config.validate().map_err(|e| anyhow!(e))?;

	// Log
	let level_filter = config
		.log_level_filter
		.try_into_level_filter()
		.map_err(|_| anyhow!("Failed to parse log level filter"))?;

	FlightLog::create()?.spawn(level_filter)?;

	info!("FPV {}", env!("CARGO_PKG_VERSION"));

	// Device backend; a connection failure here aborts startup, there is no
	// partial session.
	let backend = args
		.get_one::<String>(DEVICE_ARG)
		.map(String::as_str)
		.unwrap_or("tello");

	let device: Box<dyn Device> = match backend {
		"tello" => Box::new(TelloDevice::connect(&config)?),
		"bench" => Box::new(BenchDevice::new(config.frame_width, config.frame_height)),
		other => return Err(anyhow!("Unknown device backend \"{}\"", other).into()),
	};

	let mut screen = Screen::open(
		"FPV",
		config.frame_width,
		config.frame_height,
		config.background,
	)?;

	App::new(device, &config).run(&mut screen);

	Ok(())
}
