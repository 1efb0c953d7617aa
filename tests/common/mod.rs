#![allow(dead_code)]

use line_world_ql::environment::line_environment::{LineAction, LineEnvironment, LineEnvironmentParameter};
use line_world_ql::ql::learn::q_learning_agent::{AgentParameter, QLearningAgent};
use line_world_ql::ql::learn::self_driving_q_learner::{Parameter, SelfDrivingQLearner};
use line_world_ql::ql::prelude::Action;

pub const SEED: u64 = 20_231_019;

pub fn line_learner(
    length: usize,
    agent_param: AgentParameter,
    seed: u64,
) -> SelfDrivingQLearner<LineEnvironment> {
    let environment = LineEnvironment::new(LineEnvironmentParameter {
        length,
        start_state: 0,
        max_steps_multiplier: 3,
    })
    .unwrap();
    let agent = QLearningAgent::from_seed(length, LineAction::ACTION_SPACE as usize, agent_param, seed).unwrap();
    SelfDrivingQLearner::new(environment, agent, Parameter::default()).unwrap()
}
