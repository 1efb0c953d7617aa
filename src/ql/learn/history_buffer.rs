use std::collections::VecDeque;

use crate::ql::prelude::ModelActionType;

/// Ring buffer keeping the most recent `max_buffer_len` elements
pub struct HistoryBuffer<T> {
    max_buffer_len: usize,
    pub(crate) buffer: VecDeque<T>,
}

impl<T> HistoryBuffer<T> {
    pub fn new(max_buffer_len: usize) -> Self {
        assert!(max_buffer_len > 0);
        Self {
            max_buffer_len,
            buffer: VecDeque::with_capacity(max_buffer_len),
        }
    }

    pub fn len(&self) -> usize { self.buffer.len() }

    pub fn is_empty(&self) -> bool { self.buffer.is_empty() }

    pub fn add(
        &mut self,
        element: T,
    ) {
        if self.buffer.len() == self.max_buffer_len {
            self.buffer.pop_front();
        }
        self.buffer.push_back(element);
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> { self.buffer.iter() }

    pub fn clear(&mut self) { self.buffer.clear() }
}

/// Recent learning history the driver derives its statistics from
pub struct LearningHistory {
    actions: HistoryBuffer<ModelActionType>,
    episode_rewards: HistoryBuffer<f32>,
}

impl LearningHistory {
    pub fn new(
        action_buffer_len: usize,
        episode_reward_buffer_len: usize,
    ) -> Self {
        Self {
            actions: HistoryBuffer::new(action_buffer_len),
            episode_rewards: HistoryBuffer::new(episode_reward_buffer_len),
        }
    }

    pub fn add_action(
        &mut self,
        action: ModelActionType,
    ) {
        self.actions.add(action)
    }

    pub fn add_episode_reward(
        &mut self,
        episode_reward: f32,
    ) {
        self.episode_rewards.add(episode_reward)
    }

    pub fn actions(&self) -> &HistoryBuffer<ModelActionType> { &self.actions }

    pub fn episode_rewards(&self) -> &HistoryBuffer<f32> { &self.episode_rewards }

    /// Mean of the recorded episode rewards; 0.0 while none are recorded
    pub fn avg_episode_reward(&self) -> f32 {
        if self.episode_rewards.is_empty() {
            return 0.0;
        }
        self.episode_rewards.iter().sum::<f32>() / self.episode_rewards.len() as f32
    }

    pub fn min_episode_reward(&self) -> Option<f32> {
        self.episode_rewards.iter().copied().reduce(f32::min)
    }

    pub fn clear(&mut self) {
        self.actions.clear();
        self.episode_rewards.clear();
    }
}
