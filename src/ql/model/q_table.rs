use std::fmt::{Display, Formatter};

use crate::ql::prelude::{ModelActionType, QlError, QlResult, StateIndex};

/// Dense action-value table: one row of `n_actions` values per state, stored contiguously.
#[derive(Clone, Debug, PartialEq)]
pub struct QTable {
    n_states: usize,
    n_actions: usize,
    values: Vec<f32>,
}

impl QTable {
    pub fn new(
        n_states: usize,
        n_actions: usize,
    ) -> QlResult<Self> {
        if n_states == 0 {
            return Err(QlError::config("n_states must be at least 1"));
        }
        if n_actions == 0 || n_actions > ModelActionType::MAX as usize + 1 {
            return Err(QlError::InvalidConfig(format!("n_actions must be in 1..={}", ModelActionType::MAX as usize + 1)));
        }
        Ok(Self {
            n_states,
            n_actions,
            values: vec![0.0; n_states * n_actions],
        })
    }

    pub fn n_states(&self) -> usize { self.n_states }

    pub fn n_actions(&self) -> usize { self.n_actions }

    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    pub fn check_state(
        &self,
        state: StateIndex,
    ) -> QlResult<()> {
        if state < self.n_states {
            Ok(())
        } else {
            Err(QlError::StateOutOfRange {
                state,
                state_space: self.n_states,
            })
        }
    }

    pub fn check_action(
        &self,
        action: ModelActionType,
    ) -> QlResult<()> {
        if (action as usize) < self.n_actions {
            Ok(())
        } else {
            Err(QlError::InvalidAction {
                action: action as usize,
                action_space: self.n_actions,
            })
        }
    }

    pub fn get(
        &self,
        state: StateIndex,
        action: ModelActionType,
    ) -> QlResult<f32> {
        self.check_state(state)?;
        self.check_action(action)?;
        Ok(self.values[self.offset(state, action)])
    }

    pub fn row(
        &self,
        state: StateIndex,
    ) -> QlResult<&[f32]> {
        self.check_state(state)?;
        let start = state * self.n_actions;
        Ok(&self.values[start..start + self.n_actions])
    }

    /// Highest action value of `state`
    pub fn max_value(
        &self,
        state: StateIndex,
    ) -> QlResult<f32> {
        let row = self.row(state)?;
        Ok(row[1..].iter().fold(row[0], |max, &v| if v > max { v } else { max }))
    }

    /// Action with the highest value in `state`.
    /// Among equal values the lowest action index wins.
    pub fn best_action(
        &self,
        state: StateIndex,
    ) -> QlResult<ModelActionType> {
        let row = self.row(state)?;
        let mut best = 0;
        for (action, &value) in row.iter().enumerate().skip(1) {
            if value > row[best] {
                best = action;
            }
        }
        Ok(best as ModelActionType)
    }

    pub(crate) fn set(
        &mut self,
        state: StateIndex,
        action: ModelActionType,
        value: f32,
    ) -> QlResult<()> {
        self.check_state(state)?;
        self.check_action(action)?;
        let offset = self.offset(state, action);
        self.values[offset] = value;
        Ok(())
    }

    fn offset(
        &self,
        state: StateIndex,
        action: ModelActionType,
    ) -> usize {
        state * self.n_actions + action as usize
    }
}

impl Display for QTable {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        for (state, row) in self.values.chunks(self.n_actions).enumerate() {
            write!(f, "{:>4}:", state)?;
            for value in row {
                write!(f, " {:>8.3}", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
