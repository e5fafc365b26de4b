//! Session logger: a `log` implementation that buffers formatted lines
//! through a channel and writes them to stdout and a per-session file from a
//! background thread, so logging never blocks the control loop.

#[macro_use]
extern crate lazy_static;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::{
	fs::File,
	io,
	io::Write,
	thread,
	thread::JoinHandle,
	time::{Duration, Instant},
};

lazy_static! {
	static ref CHANNEL: (Sender<Message>, Receiver<Message>) = unbounded::<Message>();
	static ref LOGGER: ChannelLogger = ChannelLogger {
		start_instant: Instant::now()
	};
}

enum Message {
	Line(String),
	Flush,
}

/// Owns the session log file and drains the logging channel.
pub struct FlightLog {
	file: File,
	buffer: Vec<String>,
	last_flush_instant: Instant,
}

const FLUSH_PERIOD: Duration = Duration::from_secs(1);
const FLUSH_THRESHOLD: usize = 16;
const RECEIVE_TIMEOUT: Duration = Duration::from_millis(500);

impl FlightLog {
	/// Creates the per-session log file in the working directory.
	pub fn create() -> Result<Self, io::Error> {
		let file_name = chrono::Local::now()
			.format("fpv_%Y-%m-%d_%H-%M-%S.log")
			.to_string();

		Ok(Self {
			file: File::create(file_name)?,
			buffer: Vec::new(),
			last_flush_instant: Instant::now(),
		})
	}

	/// Installs the global logger and spawns the drain thread. Must be
	/// called at most once per process.
	pub fn spawn(mut self, level_filter: LevelFilter) -> Result<JoinHandle<()>, SetLoggerError> {
		log::set_logger(&*LOGGER).map(|()| log::set_max_level(level_filter))?;

		Ok(thread::spawn(move || self.receive_loop()))
	}

	fn receive_loop(&mut self) {
		loop {
			match CHANNEL.1.recv_timeout(RECEIVE_TIMEOUT) {
				Ok(Message::Line(line)) => self.buffer.push(line),
				Ok(Message::Flush) | Err(RecvTimeoutError::Timeout) => self.write_out(),
				Err(RecvTimeoutError::Disconnected) => {
					self.write_out();
					break;
				}
			}

			if self.buffer.len() >= FLUSH_THRESHOLD
				|| self.last_flush_instant.elapsed() >= FLUSH_PERIOD
			{
				self.write_out();
			}
		}
	}

	fn write_out(&mut self) {
		for line in self.buffer.drain(..) {
			println!("{}", line);

			if let Err(e) = writeln!(self.file, "{}", line) {
				// Keep logging to stdout even if the file is gone.
				eprintln!("Failed to write log file: {}", e);
			}
		}

		self.last_flush_instant = Instant::now();
	}
}

struct ChannelLogger {
	start_instant: Instant,
}

impl Log for ChannelLogger {
	fn enabled(&self, _: &Metadata) -> bool {
		true
	}

	fn log(&self, record: &Record) {
		let elapsed = self.start_instant.elapsed().as_secs_f32();

		let line = if record.level() <= Level::Warn {
			format!(
				"[{:9.3}] {:5} {}: {} ({}:{})",
				elapsed,
				record.level(),
				record.target(),
				record.args(),
				record.file_static().unwrap_or("unknown"),
				record.line().unwrap_or(0)
			)
		} else {
			format!(
				"[{:9.3}] {:5} {}: {}",
				elapsed,
				record.level(),
				record.target(),
				record.args()
			)
		};

		// If the drain thread is gone the line is dropped.
		let _ = CHANNEL.0.send(Message::Line(line));
	}

	fn flush(&self) {
		let _ = CHANNEL.0.send(Message::Flush);
	}
}
