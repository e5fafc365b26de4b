use std::fmt;
use std::fmt::{Display, Formatter};

/// One of the four independent velocity channels of the aircraft.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Axis {
    /// Left/right translation.
    Lateral,
    /// Forward/backward translation.
    Longitudinal,
    /// Up/down translation.
    Vertical,
    /// Rotation around the vertical axis.
    Yaw,
}

pub const AXES: [Axis; 4] = [Axis::Lateral, Axis::Longitudinal, Axis::Vertical, Axis::Yaw];

/// Read-only copy of the four axis values, in the order expected by the
/// `rc` command of the device.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct Snapshot {
    pub lateral: i32,
    pub longitudinal: i32,
    pub vertical: i32,
    pub yaw: i32,
}

impl Display for Snapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lat: {:+4}, lon: {:+4}, ver: {:+4}, yaw: {:+4}",
            self.lateral, self.longitudinal, self.vertical, self.yaw
        )
    }
}

/// Four bounded integer axes ramped from binary key input.
///
/// Gaining is slow (`gain_step` per call) and decaying is fast (`decay_step`
/// per call) so that a held key feels proportional while releasing it stops
/// the aircraft quickly. Values never leave `[-limit, +limit]`, and a gain in
/// one direction never lets the opposite sign through: momentum stops at zero
/// before reversing.
pub struct VelocityState {
    lateral: i32,
    longitudinal: i32,
    vertical: i32,
    yaw: i32,
    gain_step: i32,
    decay_step: i32,
    limit: i32,
}

pub const DEFAULT_GAIN_STEP: i32 = 3;
pub const DEFAULT_DECAY_STEP: i32 = 10;
pub const DEFAULT_LIMIT: i32 = 100;

impl Default for VelocityState {
    fn default() -> Self {
        Self::new(DEFAULT_GAIN_STEP, DEFAULT_DECAY_STEP, DEFAULT_LIMIT)
    }
}

impl VelocityState {
    /// All axes start at zero. `gain_step`, `decay_step` and `limit` must be
    /// strictly positive.
    pub fn new(gain_step: i32, decay_step: i32, limit: i32) -> Self {
        assert!(gain_step > 0 && decay_step > 0 && limit > 0);

        Self {
            lateral: 0,
            longitudinal: 0,
            vertical: 0,
            yaw: 0,
            gain_step,
            decay_step,
            limit,
        }
    }

    fn axis(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Lateral => self.lateral,
            Axis::Longitudinal => self.longitudinal,
            Axis::Vertical => self.vertical,
            Axis::Yaw => self.yaw,
        }
    }

    fn set_axis(&mut self, axis: Axis, value: i32) {
        match axis {
            Axis::Lateral => self.lateral = value,
            Axis::Longitudinal => self.longitudinal = value,
            Axis::Vertical => self.vertical = value,
            Axis::Yaw => self.yaw = value,
        }
    }

    /// Ramp the axis toward `+limit` by one gain step. A negative value is
    /// floored at zero first, so a direction change always passes through 0.
    pub fn gain_positive(&mut self, axis: Axis) {
        let value = (self.axis(axis) + self.gain_step).max(0).min(self.limit);
        self.set_axis(axis, value);
    }

    /// Ramp the axis toward `-limit` by one gain step, ceiling at zero.
    pub fn gain_negative(&mut self, axis: Axis) {
        let value = (self.axis(axis) - self.gain_step).min(0).max(-self.limit);
        self.set_axis(axis, value);
    }

    /// Bleed the axis toward zero by one decay step without overshooting.
    /// The "no key held" policy: faster than gaining, and the sign never
    /// flips.
    pub fn decay(&mut self, axis: Axis) {
        let value = self.axis(axis);

        let value = if value > 0 {
            (value - self.decay_step).max(0)
        } else {
            (value + self.decay_step).min(0)
        };

        self.set_axis(axis, value);
    }

    /// Zero all four axes at once. Used before takeoff, after an emergency
    /// and at session teardown.
    pub fn stop_all(&mut self) {
        self.lateral = 0;
        self.longitudinal = 0;
        self.vertical = 0;
        self.yaw = 0;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            lateral: self.lateral,
            longitudinal: self.longitudinal,
            vertical: self.vertical,
            yaw: self.yaw,
        }
    }
}
