use crate::config::FpvConfig;
use crate::device::{Device, Frame, Telemetry};
use crossbeam_channel::{unbounded, Receiver};
use openh264::decoder::Decoder;
use openh264::OpenH264API;
use std::error::Error;
use tello::{Commander, State, StateReceiver, VideoReceiver};
use velocity::Snapshot;

/// The real aircraft: command socket plus the state and video receiver
/// threads of the `tello` crate, with H.264 decoding on the consumer side.
pub struct TelloDevice {
	commander: Commander,
	state_receiver: Receiver<State>,
	video_receiver: Receiver<Vec<u8>>,
	decoder: Decoder,
	last_state: State,
}

impl TelloDevice {
	/// Establishes the session: SDK mode, zeroed stick state, video stream
	/// on. Any failure here is fatal, there is no partial session.
	pub fn connect(config: &FpvConfig) -> Result<Self, Box<dyn Error>> {
		let commander = Commander::connect(config.command_addr.as_str())?;

		let (state_sender, state_receiver) = unbounded::<State>();
		StateReceiver::bind(config.state_port)?.spawn(state_sender);

		let (video_sender, video_receiver) = unbounded::<Vec<u8>>();
		VideoReceiver::bind(config.video_port)?.spawn(video_sender);

		commander.rc(0, 0, 0, 0)?;
		commander.stream_on()?;

		info!("Tello session established at {}", config.command_addr);

		Ok(Self {
			commander,
			state_receiver,
			video_receiver,
			decoder: Decoder::new(OpenH264API::from_source())?,
			last_state: State::default(),
		})
	}
}

impl Device for TelloDevice {
	fn telemetry(&mut self) -> Result<Telemetry, Box<dyn Error>> {
		// The receiver thread outpaces the 1 Hz readout; keep the newest.
		while let Ok(state) = self.state_receiver.try_recv() {
			self.last_state = state;
		}

		let wifi_snr = self.commander.query("wifi?")?.parse().unwrap_or(0);

		Ok(Telemetry {
			battery: self.last_state.battery,
			altitude: self.last_state.height,
			temperature: self.last_state.temperature(),
			wifi_snr,
		})
	}

	fn read_frame(&mut self) -> Result<Option<Frame>, Box<dyn Error>> {
		let mut newest = None;

		// Every pending frame goes through the decoder in arrival order so
		// reference frames are never skipped; only the newest picture is
		// presented.
		while let Ok(encoded) = self.video_receiver.try_recv() {
			match self.decoder.decode(&encoded) {
				Ok(Some(yuv)) => {
					let (width, height) = yuv.dimension_rgb();

					let mut frame = Frame::new(width as u32, height as u32);
					yuv.write_rgb8(&mut frame.rgb);

					newest = Some(frame);
				}
				// The decoder wants more input before producing a picture.
				Ok(None) => {}
				Err(e) => debug!("Dropped undecodable frame: {}", e),
			}
		}

		Ok(newest)
	}

	fn send_velocity(&mut self, snapshot: &Snapshot) -> Result<(), Box<dyn Error>> {
		self.commander.rc(
			snapshot.lateral,
			snapshot.longitudinal,
			snapshot.vertical,
			snapshot.yaw,
		)?;

		Ok(())
	}

	fn take_off(&mut self) -> Result<(), Box<dyn Error>> {
		self.commander.take_off()?;
		Ok(())
	}

	fn land(&mut self) -> Result<(), Box<dyn Error>> {
		self.commander.land()?;
		Ok(())
	}

	fn emergency(&mut self) -> Result<(), Box<dyn Error>> {
		self.commander.emergency()?;
		Ok(())
	}

	fn release(&mut self) {
		if let Err(e) = self.commander.stream_off() {
			warn!("Stream off failed during release: {}", e);
		}

		if let Err(e) = self.commander.rc(0, 0, 0, 0) {
			warn!("Final rc zero failed during release: {}", e);
		}
	}
}
