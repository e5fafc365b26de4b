use crate::surface::HeldKeys;
use velocity::{Axis, VelocityState};

/// Folds one tick of held-key state into the velocity controller: exactly
/// one of gain/decay per axis. Opposite keys held together cancel out and
/// decay, the same as no key at all; the axis never freezes.
pub fn fold(held: &HeldKeys, velocity: &mut VelocityState) {
	fold_pair(velocity, Axis::Lateral, held.right, held.left);
	fold_pair(velocity, Axis::Longitudinal, held.forward, held.backward);
	fold_pair(velocity, Axis::Vertical, held.up, held.down);
	fold_pair(velocity, Axis::Yaw, held.yaw_ccw, held.yaw_cw);
}

fn fold_pair(velocity: &mut VelocityState, axis: Axis, positive_held: bool, negative_held: bool) {
	match (positive_held, negative_held) {
		(true, false) => velocity.gain_positive(axis),
		(false, true) => velocity.gain_negative(axis),
		_ => velocity.decay(axis),
	}
}

#[cfg(test)]
mod tests {
	use crate::mapper::fold;
	use crate::surface::HeldKeys;
	use velocity::VelocityState;

	#[test]
	fn no_key_decays_every_axis() {
		let mut velocity = VelocityState::default();

		for _ in 0..5 {
			fold(
				&HeldKeys {
					forward: true,
					right: true,
					up: true,
					yaw_ccw: true,
					..Default::default()
				},
				&mut velocity,
			);
		}

		fold(&HeldKeys::default(), &mut velocity);

		let snapshot = velocity.snapshot();
		assert_eq!(snapshot.longitudinal, 5);
		assert_eq!(snapshot.lateral, 5);
		assert_eq!(snapshot.vertical, 5);
		assert_eq!(snapshot.yaw, 5);
	}

	#[test]
	fn single_key_gains_its_direction() {
		let mut velocity = VelocityState::default();

		fold(
			&HeldKeys {
				backward: true,
				left: true,
				down: true,
				yaw_cw: true,
				..Default::default()
			},
			&mut velocity,
		);

		let snapshot = velocity.snapshot();
		assert_eq!(snapshot.longitudinal, -3);
		assert_eq!(snapshot.lateral, -3);
		assert_eq!(snapshot.vertical, -3);
		assert_eq!(snapshot.yaw, -3);
	}

	#[test]
	fn opposite_keys_together_decay_like_no_key() {
		let mut velocity = VelocityState::default();

		for _ in 0..4 {
			fold(
				&HeldKeys {
					forward: true,
					..Default::default()
				},
				&mut velocity,
			);
		}
		assert_eq!(velocity.snapshot().longitudinal, 12);

		fold(
			&HeldKeys {
				forward: true,
				backward: true,
				..Default::default()
			},
			&mut velocity,
		);

		// Decayed by 10, not held at 12 and not gained.
		assert_eq!(velocity.snapshot().longitudinal, 2);
	}

	#[test]
	fn axes_fold_independently() {
		let mut velocity = VelocityState::default();

		fold(
			&HeldKeys {
				forward: true,
				yaw_cw: true,
				..Default::default()
			},
			&mut velocity,
		);

		let snapshot = velocity.snapshot();
		assert_eq!(snapshot.longitudinal, 3);
		assert_eq!(snapshot.yaw, -3);
		assert_eq!(snapshot.lateral, 0);
		assert_eq!(snapshot.vertical, 0);
	}
}
