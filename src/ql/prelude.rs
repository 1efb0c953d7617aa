use std::fmt::Display;
use std::hash::Hash;

use thiserror::Error;

/// Data type we use to encode an `Action` to feed the model.
pub type ModelActionType = u8;

/// Index of a discrete state in range `0..Environment::state_space()`
pub type StateIndex = usize;

pub type QlResult<T> = Result<T, QlError>;

pub trait Action: Display + Sized + Clone + Copy + Hash + PartialEq + Eq {
    /// Number of possible actions
    const ACTION_SPACE: ModelActionType;
    /// Identifying the Action as a unique value in range (0..Self::ACTION_SPACE)
    fn numeric(&self) -> ModelActionType;
    fn try_from_numeric(value: ModelActionType) -> QlResult<Self>;
}

/// Learning environment with a discrete state space, modeling the world of a learning agent
pub trait Environment {
    type A: Action;

    /// Number of distinct states
    fn state_space(&self) -> usize;

    /// Resets the environment to a defined starting point and returns that state
    fn reset(&mut self) -> StateIndex;

    /// Current state
    fn state(&self) -> StateIndex;

    /// Performs one time/action-step.
    ///
    /// Applies the given `action` to the environment and returns:
    ///   - next state
    ///   - immediate reward earned during performing that step
    ///   - done flag (e.g. goal reached or out of steps)
    ///
    fn step(
        &mut self,
        action: Self::A,
    ) -> (StateIndex, f32, bool);

    /// Convenience wrapper around [Self::step] for callers speaking numeric actions only.
    fn step_numeric(
        &mut self,
        action: ModelActionType,
    ) -> QlResult<(StateIndex, f32, bool)> {
        let action = Self::A::try_from_numeric(action)?;
        Ok(self.step(action))
    }
}

pub trait DebugVisualizer {
    fn one_line_info(&self) -> String;
    fn render_to_console(&self) -> String;
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QlError {
    #[error("action {action} out of range (action space: {action_space})")]
    InvalidAction { action: usize, action_space: usize },
    #[error("state {state} out of range (state space: {state_space})")]
    StateOutOfRange { state: usize, state_space: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl QlError {
    pub fn config(msg: &str) -> Self { QlError::InvalidConfig(msg.to_string()) }
}
