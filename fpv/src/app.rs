use crate::clock::TickClock;
use crate::config::FpvConfig;
use crate::device::Device;
use crate::mapper;
use crate::readout::ReadoutMonitor;
use crate::surface::{Action, ControlSurface};
use velocity::VelocityState;

/// The fixed-rate control loop. Per tick, in order: telemetry readout
/// (rate limited to 1 Hz internally), discrete events, held-key fold into
/// the velocity controller, frame fetch and present, and finally the
/// unconditional velocity flush that keeps the fire-and-forget link alive.
pub struct App {
	device: Box<dyn Device>,
	velocity: VelocityState,
	readout: ReadoutMonitor,
	tick_rate_hz: u32,
	consecutive_flush_failures: u32,
	running: bool,
}

/// Three seconds at the default tick rate. Past this the link is considered
/// dead and the session terminates; the drone is already in its failsafe.
const MAX_FLUSH_FAILURES: u32 = 90;

impl App {
	pub fn new(device: Box<dyn Device>, config: &FpvConfig) -> Self {
		Self {
			device,
			velocity: VelocityState::new(
				config.gain_step,
				config.decay_step,
				config.velocity_limit,
			),
			readout: ReadoutMonitor::new(config.temperature_fahrenheit),
			tick_rate_hz: config.tick_rate_hz,
			consecutive_flush_failures: 0,
			running: true,
		}
	}

	pub fn run<S: ControlSurface>(mut self, surface: &mut S) {
		let mut clock = TickClock::new(self.tick_rate_hz);

		info!(
			"Control loop running at {} Hz ({:?} per tick)",
			self.tick_rate_hz,
			clock.period()
		);

		while self.running {
			clock.wait();

			self.readout.refresh(self.device.as_mut(), self.velocity.snapshot());

			for action in surface.poll_actions() {
				self.dispatch(action);
			}

			mapper::fold(&surface.held_keys(), &mut self.velocity);

			// A single-tick frame failure keeps the previous picture on
			// screen; the loop carries on.
			match self.device.read_frame() {
				Ok(Some(frame)) => {
					if let Err(e) = surface.present(&frame) {
						warn!("Frame present failed: {}", e);
					}
				}
				Ok(None) => {}
				Err(e) => warn!("Frame read failed: {}", e),
			}

			self.flush();
		}

		self.shutdown();
	}

	fn dispatch(&mut self, action: Action) {
		match action {
			Action::Quit => {
				info!("Quit requested");
				self.running = false;
			}
			Action::TakeOff => {
				self.velocity.stop_all();

				if let Err(e) = self.device.take_off() {
					error!("Takeoff failed: {}", e);
				}
			}
			Action::Land => {
				if let Err(e) = self.device.land() {
					error!("Landing failed: {}", e);
				}
			}
			Action::Emergency => {
				self.velocity.stop_all();

				if let Err(e) = self.device.emergency() {
					error!("Emergency stop failed: {}", e);
				}
			}
		}
	}

	fn flush(&mut self) {
		let snapshot = self.velocity.snapshot();

		match self.device.send_velocity(&snapshot) {
			Ok(()) => self.consecutive_flush_failures = 0,
			Err(e) => {
				warn!("Velocity flush failed: {}", e);

				self.consecutive_flush_failures += 1;

				if self.consecutive_flush_failures >= MAX_FLUSH_FAILURES {
					error!("Command link dead, terminating session");
					self.running = false;
				}
			}
		}
	}

	/// Best-effort teardown: zero the command, flush it one last time and
	/// release the device. Secondary errors are logged by the callees and
	/// never propagate past here.
	fn shutdown(&mut self) {
		info!("Session terminating");

		self.velocity.stop_all();
		self.flush();
		self.device.release();

		info!("Session closed");
	}
}

#[cfg(test)]
mod tests {
	use crate::app::App;
	use crate::config::FpvConfig;
	use crate::device::{Device, Frame, Telemetry};
	use crate::surface::{Action, ControlSurface, HeldKeys};
	use std::cell::RefCell;
	use std::error::Error;
	use std::rc::Rc;
	use velocity::Snapshot;

	#[derive(Default)]
	struct Trace {
		flushes: Vec<Snapshot>,
		released: bool,
		emergencies: u32,
	}

	/// Device that records every call; optionally fails everything, like a
	/// dead link.
	struct TracingDevice {
		trace: Rc<RefCell<Trace>>,
		failing: bool,
	}

	impl TracingDevice {
		fn result(&self) -> Result<(), Box<dyn Error>> {
			if self.failing {
				Err("link down".into())
			} else {
				Ok(())
			}
		}
	}

	impl Device for TracingDevice {
		fn telemetry(&mut self) -> Result<Telemetry, Box<dyn Error>> {
			self.result().map(|()| Telemetry::default())
		}

		fn read_frame(&mut self) -> Result<Option<Frame>, Box<dyn Error>> {
			self.result().map(|()| Some(Frame::new(4, 4)))
		}

		fn send_velocity(&mut self, snapshot: &Snapshot) -> Result<(), Box<dyn Error>> {
			self.trace.borrow_mut().flushes.push(*snapshot);
			self.result()
		}

		fn take_off(&mut self) -> Result<(), Box<dyn Error>> {
			self.result()
		}

		fn land(&mut self) -> Result<(), Box<dyn Error>> {
			self.result()
		}

		fn emergency(&mut self) -> Result<(), Box<dyn Error>> {
			self.trace.borrow_mut().emergencies += 1;
			self.result()
		}

		fn release(&mut self) {
			self.trace.borrow_mut().released = true;
		}
	}

	/// Scripted surface: a fixed held-key state, quitting after a set
	/// number of ticks.
	struct ScriptedSurface {
		held: HeldKeys,
		ticks_before_quit: u32,
		extra_actions: Vec<Action>,
		presented: u32,
	}

	impl ControlSurface for ScriptedSurface {
		fn poll_actions(&mut self) -> Vec<Action> {
			let mut actions = std::mem::replace(&mut self.extra_actions, Vec::new());

			if self.ticks_before_quit == 0 {
				actions.push(Action::Quit);
			} else {
				self.ticks_before_quit -= 1;
			}

			actions
		}

		fn held_keys(&self) -> HeldKeys {
			self.held
		}

		fn present(&mut self, _: &Frame) -> Result<(), Box<dyn Error>> {
			self.presented += 1;
			Ok(())
		}
	}

	fn fast_config() -> FpvConfig {
		FpvConfig {
			tick_rate_hz: 500,
			..Default::default()
		}
	}

	fn app_with(trace: &Rc<RefCell<Trace>>, failing: bool) -> App {
		App::new(
			Box::new(TracingDevice {
				trace: Rc::clone(trace),
				failing,
			}),
			&fast_config(),
		)
	}

	#[test]
	fn one_flush_per_tick_even_when_idle() {
		let trace = Rc::new(RefCell::new(Trace::default()));

		let mut surface = ScriptedSurface {
			held: HeldKeys::default(),
			ticks_before_quit: 5,
			extra_actions: Vec::new(),
			presented: 0,
		};

		app_with(&trace, false).run(&mut surface);

		// Five idle ticks, the quit tick, plus the teardown flush; every
		// one of them all-zero.
		let trace = trace.borrow();
		assert_eq!(trace.flushes.len(), 7);
		assert!(trace.flushes.iter().all(|s| *s == Snapshot::default()));
		assert!(trace.released);
	}

	#[test]
	fn held_key_ramps_and_flushes_ramped_values() {
		let trace = Rc::new(RefCell::new(Trace::default()));

		let mut surface = ScriptedSurface {
			held: HeldKeys {
				forward: true,
				..Default::default()
			},
			ticks_before_quit: 3,
			extra_actions: Vec::new(),
			presented: 0,
		};

		app_with(&trace, false).run(&mut surface);

		let trace = trace.borrow();
		let longitudinals: Vec<i32> = trace.flushes.iter().map(|s| s.longitudinal).collect();

		// Ramp of 3 per tick while held; teardown zeroes and flushes once
		// more. The quit tick still folds held keys before terminating.
		assert_eq!(longitudinals, vec![3, 6, 9, 12, 0]);
	}

	#[test]
	fn quit_runs_teardown_even_when_the_device_fails() {
		let trace = Rc::new(RefCell::new(Trace::default()));

		let mut surface = ScriptedSurface {
			held: HeldKeys::default(),
			ticks_before_quit: 1,
			extra_actions: vec![Action::Emergency],
			presented: 0,
		};

		app_with(&trace, true).run(&mut surface);

		// No panic past teardown: the final zero flush was attempted and
		// the device released despite every call failing.
		let trace = trace.borrow();
		assert_eq!(trace.emergencies, 1);
		assert!(trace.released);
		assert_eq!(*trace.flushes.last().unwrap(), Snapshot::default());
	}

	#[test]
	fn dead_link_terminates_the_loop() {
		let trace = Rc::new(RefCell::new(Trace::default()));

		let mut surface = ScriptedSurface {
			held: HeldKeys::default(),
			ticks_before_quit: u32::max_value(),
			extra_actions: Vec::new(),
			presented: 0,
		};

		app_with(&trace, true).run(&mut surface);

		// 90 consecutive flush failures, then the teardown flush.
		assert_eq!(trace.borrow().flushes.len(), 91);
		assert!(trace.borrow().released);
	}

	#[test]
	fn frames_are_presented_every_tick() {
		let trace = Rc::new(RefCell::new(Trace::default()));

		let mut surface = ScriptedSurface {
			held: HeldKeys::default(),
			ticks_before_quit: 4,
			extra_actions: Vec::new(),
			presented: 0,
		};

		app_with(&trace, false).run(&mut surface);

		assert_eq!(surface.presented, 5);
	}
}
