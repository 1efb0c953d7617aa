use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ql::model::q_table::QTable;
use crate::ql::prelude::{ModelActionType, QlError, QlResult, StateIndex};

#[derive(Clone, Debug)]
pub struct AgentParameter {
    /// Learning rate; (0 < α <= 1) how far a single experience moves the stored value towards its target
    pub alpha: f32,
    /// Discount rate; (0 < 𝛾 <= 1) represents the value of future rewards. The bigger, the more farsighted the agent becomes
    pub gamma: f32,
    /// Initial epsilon greedy parameter: probability of taking a random action
    pub epsilon: f64,
}

impl AgentParameter {
    fn validate(&self) -> QlResult<()> {
        let unit_interval = |v: f32| v.is_finite() && v > 0.0 && v <= 1.0;
        if !unit_interval(self.alpha) {
            return Err(QlError::InvalidConfig(format!("alpha must be in (0, 1], got {}", self.alpha)));
        }
        if !unit_interval(self.gamma) {
            return Err(QlError::InvalidConfig(format!("gamma must be in (0, 1], got {}", self.gamma)));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(QlError::InvalidConfig(format!("epsilon must be in [0, 1], got {}", self.epsilon)));
        }
        Ok(())
    }
}

impl Default for AgentParameter {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.9,
            epsilon: 0.3,
        }
    }
}

/// Tabular Q-learning agent with epsilon-greedy exploration.
///
/// The agent only knows state and action indices. All randomness comes from the injected `rng`,
/// so two agents built from the same seed make the same decisions given the same experience.
pub struct QLearningAgent<R: Rng = StdRng> {
    q_table: QTable,
    alpha: f32,
    gamma: f32,
    ///  Epsilon greedy parameter
    epsilon: f64,
    rng: R,
}

impl QLearningAgent<StdRng> {
    pub fn from_seed(
        n_states: usize,
        n_actions: usize,
        param: AgentParameter,
        seed: u64,
    ) -> QlResult<Self> {
        Self::new(n_states, n_actions, param, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(
        n_states: usize,
        n_actions: usize,
        param: AgentParameter,
    ) -> QlResult<Self> {
        Self::new(n_states, n_actions, param, StdRng::from_entropy())
    }
}

impl<R: Rng> QLearningAgent<R> {
    pub fn new(
        n_states: usize,
        n_actions: usize,
        param: AgentParameter,
        rng: R,
    ) -> QlResult<Self> {
        param.validate()?;
        Ok(Self {
            q_table: QTable::new(n_states, n_actions)?,
            alpha: param.alpha,
            gamma: param.gamma,
            epsilon: param.epsilon,
            rng,
        })
    }

    pub fn n_states(&self) -> usize { self.q_table.n_states() }

    pub fn n_actions(&self) -> usize { self.q_table.n_actions() }

    pub fn alpha(&self) -> f32 { self.alpha }

    pub fn gamma(&self) -> f32 { self.gamma }

    pub fn epsilon(&self) -> f64 { self.epsilon }

    pub fn q_table(&self) -> &QTable { &self.q_table }

    /// Epsilon-greedy action selection
    pub fn choose_action(
        &mut self,
        state: StateIndex,
    ) -> QlResult<ModelActionType> {
        self.q_table.check_state(state)?;
        let n_actions = self.q_table.n_actions();

        if self.epsilon > self.rng.gen_range(0_f64..1_f64) {
            // Take random action
            Ok(self.rng.gen_range(0..n_actions) as ModelActionType)
        } else {
            self.q_table.best_action(state)
        }
    }

    /// Temporal-difference update of `Q(state, action)` towards
    /// `reward` (terminal step) or `reward + 𝛾 * max_a Q(next_state, a)`.
    pub fn learn(
        &mut self,
        state: StateIndex,
        action: ModelActionType,
        reward: f32,
        next_state: StateIndex,
        done: bool,
    ) -> QlResult<()> {
        let old_value = self.q_table.get(state, action)?;
        self.q_table.check_state(next_state)?;

        let target = if done {
            reward
        } else {
            reward + self.gamma * self.q_table.max_value(next_state)?
        };

        self.q_table.set(state, action, old_value + self.alpha * (target - old_value))
    }

    /// `epsilon *= decay_rate`. The rate is not checked; rates above 1 would increase exploration.
    pub fn decay_epsilon(
        &mut self,
        decay_rate: f64,
    ) {
        self.epsilon *= decay_rate;
    }

    /// Best known action for every state
    pub fn greedy_policy(&self) -> Vec<ModelActionType> {
        (0..self.n_states())
            .map(|state| self.q_table.best_action(state).unwrap_or(0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::mock::StepRng;
    use rstest::rstest;

    use super::*;

    fn agent(epsilon: f64, alpha: f32) -> QLearningAgent {
        let param = AgentParameter {
            alpha,
            gamma: 0.9,
            epsilon,
        };
        QLearningAgent::from_seed(5, 2, param, 42).unwrap()
    }

    #[test]
    fn test_greedy_tie_break_on_fresh_table() {
        let mut agent = agent(0.0, 0.5);
        for _ in 0..100 {
            assert_eq!(agent.choose_action(2).unwrap(), 0);
        }
    }

    #[test]
    fn test_greedy_follows_learned_values() {
        let mut agent = agent(0.0, 0.5);
        agent.learn(1, 1, 10.0, 2, true).unwrap();
        assert_eq!(agent.choose_action(1).unwrap(), 1);
        assert_eq!(agent.choose_action(0).unwrap(), 0);
    }

    #[test]
    fn test_full_exploration_covers_all_actions() {
        let mut agent = agent(1.0, 0.5);
        let mut seen = [false; 2];
        for _ in 0..200 {
            seen[agent.choose_action(0).unwrap() as usize] = true;
        }
        assert_eq!(seen, [true, true]);
    }

    #[test]
    fn test_injected_rng_drives_exploration() {
        // a constant zero stream always falls below epsilon and always picks action 0
        let param = AgentParameter {
            epsilon: 0.5,
            ..AgentParameter::default()
        };
        let mut agent = QLearningAgent::new(3, 2, param, StepRng::new(0, 0)).unwrap();
        agent.learn(0, 1, 10.0, 1, true).unwrap();
        assert_eq!(agent.choose_action(0).unwrap(), 0);
    }

    #[rstest]
    #[case(0.5)]
    #[case(0.1)]
    #[case(0.99)]
    fn test_terminal_update_moves_towards_reward(#[case] alpha: f32) {
        let mut agent = agent(0.0, alpha);
        agent.learn(3, 1, 10.0, 4, true).unwrap();
        let v1 = agent.q_table().get(3, 1).unwrap();
        assert!(v1 > 0.0 && v1 < 10.0);
        agent.learn(3, 1, 10.0, 4, true).unwrap();
        let v2 = agent.q_table().get(3, 1).unwrap();
        assert!(v2 > v1 && v2 < 10.0);
    }

    #[test]
    fn test_non_terminal_update_bootstraps_from_next_state() {
        let mut agent = agent(0.0, 0.5);
        agent.learn(3, 1, 10.0, 4, true).unwrap(); // Q(3,1) = 5.0
        agent.learn(2, 1, -1.0, 3, false).unwrap(); // target = -1 + 0.9 * 5 = 3.5
        assert!((agent.q_table().get(2, 1).unwrap() - 1.75).abs() < 1e-6);
        // untouched cells stay zero
        assert_eq!(agent.q_table().get(2, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_epsilon_decay() {
        let mut agent = agent(0.3, 0.1);
        agent.decay_epsilon(0.5);
        agent.decay_epsilon(0.5);
        assert!((agent.epsilon() - 0.075).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_indices_are_rejected() {
        let mut agent = agent(0.0, 0.5);
        assert_eq!(agent.choose_action(5), Err(QlError::StateOutOfRange { state: 5, state_space: 5 }));
        assert_eq!(agent.learn(0, 2, 1.0, 1, false), Err(QlError::InvalidAction { action: 2, action_space: 2 }));
        assert_eq!(agent.learn(0, 1, 1.0, 7, false), Err(QlError::StateOutOfRange { state: 7, state_space: 5 }));
        assert_eq!(agent.q_table().get(0, 1).unwrap(), 0.0);
    }

    #[rstest]
    #[case(0.0, 0.9, 0.3)]
    #[case(1.5, 0.9, 0.3)]
    #[case(0.1, 0.0, 0.3)]
    #[case(0.1, f32::NAN, 0.3)]
    #[case(0.1, 0.9, -0.1)]
    #[case(0.1, 0.9, 1.1)]
    fn test_invalid_parameters(#[case] alpha: f32, #[case] gamma: f32, #[case] epsilon: f64) {
        let param = AgentParameter { alpha, gamma, epsilon };
        assert!(matches!(QLearningAgent::from_seed(5, 2, param, 0), Err(QlError::InvalidConfig(_))));
    }

    #[test]
    fn test_same_seed_same_decisions() {
        let mut a = agent(0.5, 0.1);
        let mut b = agent(0.5, 0.1);
        let actions_a: Vec<_> = (0..50).map(|_| a.choose_action(1).unwrap()).collect();
        let actions_b: Vec<_> = (0..50).map(|_| b.choose_action(1).unwrap()).collect();
        assert_eq!(actions_a, actions_b);
    }
}
