use anyhow::Result;
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::Rng;
use rustc_hash::FxHashMap;

use crate::ql::learn::history_buffer::LearningHistory;
use crate::ql::learn::q_learning_agent::QLearningAgent;
use crate::ql::prelude::{Action, DebugVisualizer, Environment, ModelActionType, QlError, StateIndex};
use crate::util::format;

pub struct Parameter {
    /// Factor applied to epsilon once after every finished episode
    pub epsilon_decay_rate: f64,
    /// Number of recent episodes the running reward is averaged over
    pub episode_reward_history_buffer_len: usize,
    /// Number of recent actions the action distribution statistic covers
    pub action_history_buffer_len: usize,
    /// Log learning statistics every n finished episodes
    pub stats_after_episodes: usize,
}

impl Default for Parameter {
    fn default() -> Self {
        Self {
            epsilon_decay_rate: 0.99,
            episode_reward_history_buffer_len: 100,
            action_history_buffer_len: 1_000,
            stats_after_episodes: 100,
        }
    }
}

/// The most recent transition the learner went through
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LastTransition {
    pub reward: f32,
    pub action: ModelActionType,
    /// Steps taken within the episode, including this one
    pub step_count: usize,
    /// Episodes finished so far
    pub episode_count: usize,
}

/// Outcome of a single [SelfDrivingQLearner::learn_step]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepOutcome {
    pub state: StateIndex,
    pub action: ModelActionType,
    pub reward: f32,
    pub next_state: StateIndex,
    pub done: bool,
}

/// A self-driving tabular Q-learner.
/// It owns an environment and an agent and drives the steps in that environment with the agent's decisions.
///
/// The learner may be driven one step at a time ([Self::learn_step]), one episode at a time
/// ([Self::learn_episode]) or in batches ([Self::learn_episodes]). Epsilon decays exactly once per finished episode.
pub struct SelfDrivingQLearner<E, R = StdRng>
where
    E: Environment + DebugVisualizer,
    R: Rng,
{
    environment: E,
    agent: QLearningAgent<R>,
    param: Parameter,
    history: LearningHistory,
    episode_running: bool,
    episode_reward: f32,
    episode_steps: usize,
    step_count: usize,
    episode_count: usize,
    last_transition: Option<LastTransition>,
}

impl<E, R> SelfDrivingQLearner<E, R>
where
    E: Environment + DebugVisualizer,
    R: Rng,
{
    pub fn new(
        environment: E,
        agent: QLearningAgent<R>,
        param: Parameter,
    ) -> Result<Self> {
        if agent.n_states() != environment.state_space() {
            return Err(QlError::InvalidConfig(format!(
                "agent knows {} states, environment has {}",
                agent.n_states(),
                environment.state_space()
            ))
            .into());
        }
        if agent.n_actions() != E::A::ACTION_SPACE as usize {
            return Err(QlError::InvalidConfig(format!(
                "agent knows {} actions, environment has {}",
                agent.n_actions(),
                E::A::ACTION_SPACE
            ))
            .into());
        }
        if param.episode_reward_history_buffer_len == 0 || param.action_history_buffer_len == 0 {
            return Err(QlError::config("history buffer lengths must be at least 1").into());
        }

        let history = LearningHistory::new(param.action_history_buffer_len, param.episode_reward_history_buffer_len);
        Ok(Self {
            environment,
            agent,
            param,
            history,
            episode_running: false,
            episode_reward: 0.0,
            episode_steps: 0,
            step_count: 0,
            episode_count: 0,
            last_transition: None,
        })
    }

    pub fn environment(&self) -> &E { &self.environment }

    pub fn agent(&self) -> &QLearningAgent<R> { &self.agent }

    pub fn step_count(&self) -> usize { self.step_count }

    pub fn episode_count(&self) -> usize { self.episode_count }

    pub fn last_transition(&self) -> Option<LastTransition> { self.last_transition }

    pub fn episode_running(&self) -> bool { self.episode_running }

    /// Mean reward of the recent episodes
    pub fn running_reward(&self) -> f32 { self.history.avg_episode_reward() }

    /// Performs one choose-step-learn cycle, starting a new episode first if none is running.
    pub fn learn_step(&mut self) -> Result<StepOutcome> {
        if !self.episode_running {
            self.start_episode();
        }

        let state = self.environment.state();
        let action = self.agent.choose_action(state)?;
        let typed_action = E::A::try_from_numeric(action)?;
        let (next_state, reward, done) = self.environment.step(typed_action);
        self.agent.learn(state, action, reward, next_state, done)?;
        log::trace!(
            "step with action {} from state {} resulted in state {}, reward: {:.2}, done: {}",
            typed_action,
            state,
            next_state,
            reward,
            done
        );

        self.step_count += 1;
        self.episode_steps += 1;
        self.episode_reward += reward;
        self.history.add_action(action);

        if done {
            self.finish_episode();
        }

        self.last_transition = Some(LastTransition {
            reward,
            action,
            step_count: self.episode_steps,
            episode_count: self.episode_count,
        });

        Ok(StepOutcome {
            state,
            action,
            reward,
            next_state,
            done,
        })
    }

    /// Runs one complete episode from a fresh reset. Returns the episode reward.
    pub fn learn_episode(&mut self) -> Result<f32> {
        self.start_episode();
        loop {
            if self.learn_step()?.done {
                break;
            }
        }
        Ok(self.episode_reward)
    }

    /// Runs `episodes` episodes back to back and returns the final transition of the last one.
    pub fn learn_episodes(
        &mut self,
        episodes: usize,
    ) -> Result<Option<LastTransition>> {
        for _ in 0..episodes {
            self.learn_episode()?;
        }
        Ok(self.last_transition)
    }

    /// Puts the environment back to its starting point and restarts episode counting.
    /// Learned values and the current epsilon are kept.
    pub fn reset(&mut self) {
        self.environment.reset();
        self.episode_running = false;
        self.episode_reward = 0.0;
        self.episode_steps = 0;
        self.episode_count = 0;
        self.last_transition = None;
        self.history.clear();
    }

    fn start_episode(&mut self) {
        if self.episode_running {
            log::debug!("aborting episode {} after {} steps", self.episode_count, self.episode_steps);
        }
        self.environment.reset();
        self.episode_running = true;
        self.episode_reward = 0.0;
        self.episode_steps = 0;
        log::trace!("started learning episode {}", self.episode_count);
    }

    fn finish_episode(&mut self) {
        self.agent.decay_epsilon(self.param.epsilon_decay_rate);
        self.history.add_episode_reward(self.episode_reward);
        self.episode_count += 1;
        self.episode_running = false;

        log::debug!(
            "episode {} finished after {} steps with reward {:.1}; {}",
            self.episode_count,
            self.episode_steps,
            self.episode_reward,
            self.environment.one_line_info()
        );

        if self.param.stats_after_episodes > 0 && self.episode_count % self.param.stats_after_episodes == 0 {
            self.learning_update_log();
        }
    }

    fn learning_update_log(&self) {
        let mut action_counts = FxHashMap::<ModelActionType, usize>::default();
        for &a in self.history.actions().iter() {
            action_counts.entry(a).and_modify(|e| *e += 1).or_insert(1);
        }

        let total_actions = self.history.actions().len();
        let action_distribution_line = action_counts
            .iter()
            .sorted()
            .map(|(&action, &count)| {
                let ratio = 100.0 * count as f32 / total_actions as f32;
                match E::A::try_from_numeric(action) {
                    Ok(a) => format!("{} {:.1}%", a, ratio),
                    Err(_) => format!("{} {:.1}%", action, ratio),
                }
            })
            .join(", ");

        log::info!(
            "\n\
    episode: {}, steps: {}, 𝛾={:.2}, 𝜀={:.3}, current_rewards: {{mean: {:.1}, low: {:.1}}}\n\
    action_distribution (of last {}): {}",
            format::count(self.episode_count),
            format::count(self.step_count),
            self.agent.gamma(),
            self.agent.epsilon(),
            self.history.avg_episode_reward(),
            self.history.min_episode_reward().unwrap_or_default(),
            format::count(total_actions),
            action_distribution_line
        );
    }
}
