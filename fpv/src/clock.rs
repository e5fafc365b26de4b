use std::thread;
use std::time::{Duration, Instant};

/// Fixed-rate tick source driven by the monotonic clock. `wait` blocks the
/// caller until the next tick boundary; there is no timer state outside this
/// struct.
pub struct TickClock {
	period: Duration,
	deadline: Instant,
}

impl TickClock {
	pub fn new(rate_hz: u32) -> Self {
		assert!(rate_hz > 0);

		let period = Duration::from_secs(1) / rate_hz;

		Self {
			period,
			deadline: Instant::now() + period,
		}
	}

	pub fn period(&self) -> Duration {
		self.period
	}

	/// Sleeps until the current deadline, then arms the next one. When the
	/// loop body overran the deadline the schedule restarts from now: one
	/// late tick never causes a burst of catch-up ticks.
	pub fn wait(&mut self) {
		let now = Instant::now();

		if self.deadline > now {
			thread::sleep(self.deadline - now);
		}

		let now = Instant::now();

		self.deadline = if now >= self.deadline + self.period {
			now + self.period
		} else {
			self.deadline + self.period
		};
	}
}
