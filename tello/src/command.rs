use std::io;
use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

/// Command channel of the drone: blocking request/response over UDP.
///
/// `rc` and `emergency` are fire and forget, everything else waits for the
/// drone's textual reply.
pub struct Commander {
	socket: UdpSocket,
	peer: SocketAddr,
}

const RESPONSE_TIMEOUT: Duration = Duration::from_secs(7);

/// Takeoff and landing spin the motors up/down before the drone replies.
const ACTION_TIMEOUT: Duration = Duration::from_secs(20);

impl Commander {
	/// Binds a local socket and puts the drone into SDK mode. Fails if the
	/// drone does not acknowledge `command`, in which case no session exists.
	pub fn connect<A: ToSocketAddrs>(peer: A) -> Result<Self, io::Error> {
		let peer = peer
			.to_socket_addrs()?
			.next()
			.ok_or_else(|| io::Error::new(ErrorKind::AddrNotAvailable, "No peer address"))?;

		let socket = UdpSocket::bind(("0.0.0.0", 0))?;

		let commander = Self { socket, peer };

		const ATTEMPTS: u32 = 3;

		let mut last_error = None;

		for attempt in 1..=ATTEMPTS {
			match commander.exchange("command", RESPONSE_TIMEOUT) {
				Ok(_) => return Ok(commander),
				Err(e) => {
					warn!("SDK mode attempt {}/{} failed: {}", attempt, ATTEMPTS, e);
					last_error = Some(e);
				}
			}
		}

		Err(last_error.unwrap())
	}

	/// Sends `command` and waits for the reply. An `error*` reply is turned
	/// into an `io::Error`.
	fn exchange(&self, command: &str, timeout: Duration) -> Result<String, io::Error> {
		debug!(target: "tello_command", "{}", command);

		self.socket.set_read_timeout(Some(timeout))?;
		self.socket.send_to(command.as_bytes(), self.peer)?;

		let mut buffer = [0u8; 1024];

		let (len, _) = self.socket.recv_from(&mut buffer)?;

		let response = String::from_utf8_lossy(&buffer[..len]).trim().to_string();

		debug!(target: "tello_response", "{}", response);

		if response.starts_with("error") {
			Err(io::Error::new(
				ErrorKind::Other,
				format!("Drone rejected \"{}\": {}", command, response),
			))
		} else {
			Ok(response)
		}
	}

	fn expect_ok(&self, command: &str, timeout: Duration) -> Result<(), io::Error> {
		let response = self.exchange(command, timeout)?;

		// Firmwares answer "ok", "OK" or the command echoed back.
		if response.eq_ignore_ascii_case("ok") || response == command {
			Ok(())
		} else {
			Err(io::Error::new(
				ErrorKind::InvalidData,
				format!("Unexpected reply to \"{}\": {}", command, response),
			))
		}
	}

	/// Reads a value, e.g. `query("wifi?")` for the signal noise ratio.
	pub fn query(&self, command: &str) -> Result<String, io::Error> {
		self.exchange(command, RESPONSE_TIMEOUT)
	}

	pub fn take_off(&self) -> Result<(), io::Error> {
		self.expect_ok("takeoff", ACTION_TIMEOUT)
	}

	pub fn land(&self) -> Result<(), io::Error> {
		self.expect_ok("land", ACTION_TIMEOUT)
	}

	/// Cuts the motors immediately. No reply is awaited: when this is needed
	/// there is no time to block on the link.
	pub fn emergency(&self) -> Result<(), io::Error> {
		self.socket.send_to(b"emergency", self.peer)?;
		Ok(())
	}

	pub fn stream_on(&self) -> Result<(), io::Error> {
		self.expect_ok("streamon", RESPONSE_TIMEOUT)
	}

	pub fn stream_off(&self) -> Result<(), io::Error> {
		self.expect_ok("streamoff", RESPONSE_TIMEOUT)
	}

	/// Sends a stick command, fire and forget. The drone holds the last
	/// received values and falls back to hovering when they stop arriving,
	/// so this is meant to be called at a fixed rate.
	pub fn rc(&self, lateral: i32, longitudinal: i32, vertical: i32, yaw: i32) -> Result<(), io::Error> {
		let command = rc_command(lateral, longitudinal, vertical, yaw);

		self.socket.send_to(command.as_bytes(), self.peer)?;

		Ok(())
	}
}

fn rc_command(lateral: i32, longitudinal: i32, vertical: i32, yaw: i32) -> String {
	const STICK_RANGE: i32 = 100;

	let clamp = |value: i32| value.max(-STICK_RANGE).min(STICK_RANGE);

	format!(
		"rc {} {} {} {}",
		clamp(lateral),
		clamp(longitudinal),
		clamp(vertical),
		clamp(yaw)
	)
}
