use crossbeam_channel::Sender;
use std::io;
use std::net::UdpSocket;
use std::thread;
use std::thread::JoinHandle;

/// One state packet of the drone, pushed roughly ten times per second.
///
/// Only the fields the application reads are kept; unknown keys are ignored
/// so firmware additions do not break the parser.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct State {
	/// Battery charge, percent.
	pub battery: i32,
	/// Height above the takeoff point, centimeters.
	pub height: i32,
	/// Lowest/highest onboard temperature, degrees Celsius.
	pub temperature_low: f32,
	pub temperature_high: f32,
	/// Barometric altitude, meters.
	pub barometer: f32,
	/// Motor-on time, seconds.
	pub flight_time: i32,
}

impl State {
	/// Midpoint of the onboard temperature range.
	pub fn temperature(&self) -> f32 {
		(self.temperature_low + self.temperature_high) / 2.0
	}

	/// Parses a `key:value;key:value;...` packet. Returns `None` when the
	/// battery field is missing or garbled, which marks the whole packet as
	/// unusable; any other field failing to parse keeps its default.
	pub fn parse(packet: &str) -> Option<State> {
		let mut state = State::default();
		let mut battery_seen = false;

		for pair in packet.trim().split(';') {
			let mut parts = pair.splitn(2, ':');

			let key = match parts.next() {
				Some(key) => key,
				None => continue,
			};

			let value = match parts.next() {
				Some(value) => value,
				None => continue,
			};

			match key {
				"bat" => {
					if let Ok(battery) = value.parse() {
						state.battery = battery;
						battery_seen = true;
					}
				}
				"h" => state.height = value.parse().unwrap_or_default(),
				"templ" => state.temperature_low = value.parse().unwrap_or_default(),
				"temph" => state.temperature_high = value.parse().unwrap_or_default(),
				"baro" => state.barometer = value.parse().unwrap_or_default(),
				"time" => state.flight_time = value.parse().unwrap_or_default(),
				_ => {}
			}
		}

		if battery_seen {
			Some(state)
		} else {
			None
		}
	}
}

/// Owns the state socket and forwards every parsed packet to a channel.
/// The consumer is expected to keep only the latest value.
pub struct StateReceiver {
	socket: UdpSocket,
}

impl StateReceiver {
	pub fn bind(port: u16) -> Result<Self, io::Error> {
		let socket = UdpSocket::bind(("0.0.0.0", port))?;

		Ok(Self { socket })
	}

	fn receive_loop(&self, sender: Sender<State>) {
		let mut buffer = [0u8; 1024];

		loop {
			let len = match self.socket.recv(&mut buffer) {
				Ok(len) => len,
				Err(e) => {
					error!("State receive failed: {}", e);
					continue;
				}
			};

			let packet = String::from_utf8_lossy(&buffer[..len]);

			if let Some(state) = State::parse(&packet) {
				if sender.send(state).is_err() {
					// Consumer is gone, session is over.
					break;
				}
			} else {
				warn!("Discarding unusable state packet: {}", packet.trim());
			}
		}
	}

	pub fn spawn(self, sender: Sender<State>) -> JoinHandle<()> {
		thread::spawn(move || self.receive_loop(sender))
	}
}

#[cfg(test)]
mod tests {
	use crate::state::State;

	const PACKET: &'static str =
		"pitch:0;roll:-1;yaw:3;vgx:0;vgy:0;vgz:0;templ:62;temph:65;tof:10;h:40;bat:87;\
		 baro:163.41;time:12;agx:5.00;agy:-9.00;agz:-999.00;\r\n";

	#[test]
	fn parses_full_packet() {
		let state = State::parse(PACKET).unwrap();

		assert_eq!(state.battery, 87);
		assert_eq!(state.height, 40);
		assert_eq!(state.temperature_low, 62.0);
		assert_eq!(state.temperature_high, 65.0);
		assert_eq!(state.barometer, 163.41);
		assert_eq!(state.flight_time, 12);
	}

	#[test]
	fn temperature_is_the_range_midpoint() {
		let state = State::parse(PACKET).unwrap();
		assert_eq!(state.temperature(), 63.5);
	}

	#[test]
	fn missing_battery_discards_the_packet() {
		assert_eq!(State::parse("h:40;templ:62;temph:65;"), None);
		assert_eq!(State::parse("bat:very;h:40;"), None);
	}

	#[test]
	fn garbled_secondary_field_keeps_its_default() {
		let state = State::parse("bat:55;h:oops;templ:60;").unwrap();

		assert_eq!(state.battery, 55);
		assert_eq!(state.height, 0);
		assert_eq!(state.temperature_low, 60.0);
	}

	#[test]
	fn unknown_keys_are_ignored() {
		let state = State::parse("bat:12;mystery:7;;").unwrap();
		assert_eq!(state.battery, 12);
	}
}
