//! Accumulated velocity command
//!
//! Holds the twist that is republished on every tick. Values only change
//! through [`VelocityState::apply`]; there is no clamping, repeated presses
//! accumulate without bound.

use serde::{Deserialize, Serialize};

use crate::mapping::Command;

/// Velocity change applied per keypress
pub const VELOCITY_STEP: f64 = 0.01;

/// Three component vector, laid out like `geometry_msgs/Vector3`
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Velocity command with linear and angular parts
///
/// Only `linear.x` (right), `linear.y` (forward) and `angular.z` (turn rate)
/// are driven by the operator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VelocityState {
    pub linear: Vector3,
    pub angular: Vector3,
}

impl VelocityState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one mapped command to the accumulator
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::IncreaseForward => self.linear.y += VELOCITY_STEP,
            Command::DecreaseForward => self.linear.y -= VELOCITY_STEP,
            Command::IncreaseRight => self.linear.x += VELOCITY_STEP,
            Command::DecreaseRight => self.linear.x -= VELOCITY_STEP,
            Command::IncreaseAngular => self.angular.z += VELOCITY_STEP,
            Command::DecreaseAngular => self.angular.z -= VELOCITY_STEP,
            Command::Stop => {
                self.linear.x = 0.0;
                self.linear.y = 0.0;
                self.angular.z = 0.0;
            }
            Command::NoOp => {}
        }
    }
}

impl std::fmt::Display for VelocityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "linear.x={:.2} linear.y={:.2} angular.z={:.2}",
            self.linear.x, self.linear.y, self.angular.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const EPS: f64 = 1e-9;

    fn components(state: &VelocityState) -> (f64, f64, f64) {
        (state.linear.x, state.linear.y, state.angular.z)
    }

    #[rstest]
    #[case(Command::IncreaseForward, (0.0, 1.0, 0.0))]
    #[case(Command::DecreaseForward, (0.0, -1.0, 0.0))]
    #[case(Command::IncreaseRight, (1.0, 0.0, 0.0))]
    #[case(Command::DecreaseRight, (-1.0, 0.0, 0.0))]
    #[case(Command::IncreaseAngular, (0.0, 0.0, 1.0))]
    #[case(Command::DecreaseAngular, (0.0, 0.0, -1.0))]
    fn repeated_command_accumulates_linearly(
        #[case] command: Command,
        #[case] direction: (f64, f64, f64),
        #[values(0, 1, 7, 250)] presses: u32,
    ) {
        let mut state = VelocityState::new();
        for _ in 0..presses {
            state.apply(command);
        }

        let expected = f64::from(presses) * VELOCITY_STEP;
        let (x, y, z) = components(&state);
        assert!((x - direction.0 * expected).abs() < EPS);
        assert!((y - direction.1 * expected).abs() < EPS);
        assert!((z - direction.2 * expected).abs() < EPS);
    }

    #[test]
    fn stop_zeroes_every_driven_field() {
        let mut state = VelocityState::new();
        for command in [
            Command::IncreaseForward,
            Command::DecreaseRight,
            Command::DecreaseRight,
            Command::IncreaseAngular,
        ] {
            state.apply(command);
        }
        assert_ne!(state, VelocityState::default());

        state.apply(Command::Stop);
        assert_eq!(components(&state), (0.0, 0.0, 0.0));

        state.apply(Command::Stop);
        assert_eq!(state, VelocityState::default());
    }

    #[test]
    fn noop_leaves_state_bit_identical() {
        let mut state = VelocityState::new();
        state.apply(Command::IncreaseRight);
        state.apply(Command::DecreaseAngular);
        let before = state;

        state.apply(Command::NoOp);

        assert_eq!(state.linear.x.to_bits(), before.linear.x.to_bits());
        assert_eq!(state.linear.y.to_bits(), before.linear.y.to_bits());
        assert_eq!(state.angular.z.to_bits(), before.angular.z.to_bits());
    }

    #[test]
    fn angular_presses_cross_zero() {
        let mut state = VelocityState::new();
        state.apply(Command::IncreaseAngular);
        assert!((state.angular.z - 0.01).abs() < EPS);

        state.apply(Command::DecreaseAngular);
        state.apply(Command::DecreaseAngular);
        assert!((state.angular.z + 0.01).abs() < EPS);
        assert_eq!(state.linear, Vector3::default());
    }

    #[test]
    fn serializes_as_twist() {
        let mut state = VelocityState::new();
        state.apply(Command::IncreaseRight);

        let json = serde_json::to_value(state).unwrap();
        assert_eq!(json["linear"]["x"], 0.01);
        assert_eq!(json["linear"]["y"], 0.0);
        assert_eq!(json["angular"]["z"], 0.0);
    }
}
