use crossbeam_channel::Sender;
use std::io;
use std::net::UdpSocket;
use std::thread;
use std::thread::JoinHandle;

/// The drone fills datagrams up to this size; a shorter datagram carries the
/// tail of an encoded frame.
const CHUNK_SIZE: usize = 1460;

const FRAME_CAPACITY: usize = 64 * 1024;

/// Appends one datagram to the frame under assembly. A datagram shorter
/// than a full chunk closes the frame, which is returned whole and replaced
/// by an empty one.
fn accumulate(frame: &mut Vec<u8>, datagram: &[u8]) -> Option<Vec<u8>> {
	frame.extend_from_slice(datagram);

	if datagram.len() < CHUNK_SIZE {
		Some(std::mem::replace(frame, Vec::with_capacity(FRAME_CAPACITY)))
	} else {
		None
	}
}

/// Owns the video socket and reassembles datagrams into encoded H.264
/// frames. Frames are forwarded undecoded; a slow consumer drops nothing
/// here, it just lags (the consumer drains to the newest frame instead).
pub struct VideoReceiver {
	socket: UdpSocket,
}

impl VideoReceiver {
	pub fn bind(port: u16) -> Result<Self, io::Error> {
		let socket = UdpSocket::bind(("0.0.0.0", port))?;

		Ok(Self { socket })
	}

	fn receive_loop(&self, sender: Sender<Vec<u8>>) {
		let mut frame = Vec::with_capacity(FRAME_CAPACITY);
		let mut buffer = [0u8; 2048];

		loop {
			let len = match self.socket.recv(&mut buffer) {
				Ok(len) => len,
				Err(e) => {
					error!("Video receive failed: {}", e);
					// A torn frame would only confuse the decoder.
					frame.clear();
					continue;
				}
			};

			if let Some(complete) = accumulate(&mut frame, &buffer[..len]) {
				if sender.send(complete).is_err() {
					break;
				}
			}
		}
	}

	pub fn spawn(self, sender: Sender<Vec<u8>>) -> JoinHandle<()> {
		thread::spawn(move || self.receive_loop(sender))
	}
}
