use std::fmt::{Display, Formatter};

use crate::ql::prelude::{Action, DebugVisualizer, Environment, ModelActionType, QlError, QlResult, StateIndex};

pub const GOAL_REWARD: f32 = 10.0;
pub const STEP_REWARD: f32 = -1.0;

#[derive(Clone, Debug)]
pub struct LineEnvironmentParameter {
    /// Number of cells; the goal is the last one
    pub length: usize,
    pub start_state: StateIndex,
    /// An episode is cut off after `length * max_steps_multiplier` steps
    pub max_steps_multiplier: usize,
}

impl Default for LineEnvironmentParameter {
    fn default() -> Self {
        Self {
            length: 10,
            start_state: 0,
            max_steps_multiplier: 3,
        }
    }
}

/// A line of `length` cells.
///
/// The agent starts on `start_state` and walks one cell left or right per step, blocked by the walls at both ends.
/// - Game goal: reach the last cell (`goal_state`)
/// - Reward: +10 for the step arriving at the goal, -1 for every other step (including blocked moves and the final
///   step of an episode running out of steps)
#[derive(Clone, Debug)]
pub struct LineEnvironment {
    length: usize,
    start_state: StateIndex,
    goal_state: StateIndex,
    max_steps: usize,
    state: StateIndex,
    steps_taken: usize,
}

impl LineEnvironment {
    pub fn new(param: LineEnvironmentParameter) -> QlResult<Self> {
        if param.length < 2 {
            return Err(QlError::InvalidConfig(format!("length must be at least 2, got {}", param.length)));
        }
        if param.start_state >= param.length {
            return Err(QlError::InvalidConfig(format!(
                "start_state {} lies outside of the line (length {})",
                param.start_state, param.length
            )));
        }
        if param.max_steps_multiplier == 0 {
            return Err(QlError::config("max_steps_multiplier must be at least 1"));
        }

        Ok(Self {
            length: param.length,
            start_state: param.start_state,
            goal_state: param.length - 1,
            max_steps: param.length * param.max_steps_multiplier,
            state: param.start_state,
            steps_taken: 0,
        })
    }

    pub fn with_length(length: usize) -> QlResult<Self> {
        Self::new(LineEnvironmentParameter {
            length,
            ..LineEnvironmentParameter::default()
        })
    }

    pub fn length(&self) -> usize { self.length }

    pub fn start_state(&self) -> StateIndex { self.start_state }

    pub fn goal_state(&self) -> StateIndex { self.goal_state }

    pub fn max_steps(&self) -> usize { self.max_steps }

    pub fn steps_taken(&self) -> usize { self.steps_taken }

    fn do_move(
        &mut self,
        action: LineAction,
    ) {
        self.state = match action {
            LineAction::Left => self.state.saturating_sub(1),
            LineAction::Right => usize::min(self.state + 1, self.goal_state),
        };
        self.steps_taken += 1;
    }
}

impl Environment for LineEnvironment {
    type A = LineAction;

    fn state_space(&self) -> usize { self.length }

    fn reset(&mut self) -> StateIndex {
        self.state = self.start_state;
        self.steps_taken = 0;
        self.state
    }

    fn state(&self) -> StateIndex { self.state }

    fn step(
        &mut self,
        action: Self::A,
    ) -> (StateIndex, f32, bool) {
        self.do_move(action);

        let goal_reached = self.state == self.goal_state;
        let reward = if goal_reached { GOAL_REWARD } else { STEP_REWARD };
        let done = goal_reached || self.steps_taken >= self.max_steps;
        (self.state, reward, done)
    }
}

impl DebugVisualizer for LineEnvironment {
    fn one_line_info(&self) -> String {
        format!(
            "LineEnvironment: position: {}, goal: {}, distance: {}, steps: {}/{}",
            self.state,
            self.goal_state,
            self.goal_state - self.state,
            self.steps_taken,
            self.max_steps
        )
    }

    fn render_to_console(&self) -> String {
        (0..self.length)
            .map(|cell| {
                if cell == self.state {
                    'A'
                } else if cell == self.goal_state {
                    'G'
                } else {
                    '.'
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum LineAction {
    Left,
    Right,
}

impl Display for LineAction {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            LineAction::Left => f.write_str("←"),
            LineAction::Right => f.write_str("→"),
        }
    }
}

impl Action for LineAction {
    const ACTION_SPACE: ModelActionType = 2;

    fn numeric(&self) -> ModelActionType {
        match self {
            LineAction::Left => 0,
            LineAction::Right => 1,
        }
    }

    fn try_from_numeric(value: ModelActionType) -> QlResult<Self> {
        match value {
            0 => Ok(LineAction::Left),
            1 => Ok(LineAction::Right),
            _ => Err(QlError::InvalidAction {
                action: value as usize,
                action_space: Self::ACTION_SPACE as usize,
            }),
        }
    }
}
