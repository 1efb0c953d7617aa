use anyhow::Result;
use line_world_ql::environment::line_environment::{LineEnvironment, LineEnvironmentParameter};
use line_world_ql::ql::learn::q_learning_agent::{AgentParameter, QLearningAgent};
use line_world_ql::ql::prelude::{Environment, QlError};
use rstest::rstest;

mod common;

fn line_of_five() -> LineEnvironment {
    LineEnvironment::new(LineEnvironmentParameter {
        length: 5,
        start_state: 0,
        max_steps_multiplier: 3,
    })
    .unwrap()
}

#[test]
fn test_forced_walk_to_goal() -> Result<()> {
    let mut env = line_of_five();
    let param = AgentParameter {
        alpha: 0.5,
        gamma: 0.9,
        epsilon: 0.0,
    };
    let mut agent = QLearningAgent::from_seed(5, 2, param, common::SEED)?;

    let mut state = env.reset();
    let mut states = vec![];
    let mut rewards = vec![];
    let mut dones = vec![];
    for action in [1, 1, 1, 1] {
        let (next_state, reward, done) = env.step_numeric(action)?;
        agent.learn(state, action, reward, next_state, done)?;
        states.push(next_state);
        rewards.push(reward);
        dones.push(done);
        state = next_state;
    }

    assert_eq!(states, vec![1, 2, 3, 4]);
    assert_eq!(rewards, vec![-1.0, -1.0, -1.0, 10.0]);
    assert_eq!(dones, vec![false, false, false, true]);

    let q = agent.q_table();
    assert_eq!(q.get(0, 1)?, -0.5);
    assert_eq!(q.get(1, 1)?, -0.5);
    assert_eq!(q.get(2, 1)?, -0.5);
    assert_eq!(q.get(3, 1)?, 5.0);
    assert_eq!(q.row(4)?, &[0.0, 0.0]);
    Ok(())
}

#[rstest]
#[case(2)]
#[case(5)]
#[case(12)]
fn test_episode_length_is_capped(#[case] length: usize) -> Result<()> {
    let mut env = LineEnvironment::with_length(length)?;
    env.reset();
    let mut steps = 0;
    loop {
        let (state, reward, done) = env.step_numeric(0)?;
        steps += 1;
        assert_eq!(state, 0);
        assert_eq!(reward, -1.0);
        if done {
            break;
        }
    }
    assert_eq!(steps, length * 3);
    Ok(())
}

#[test]
fn test_reset_mid_episode_restarts_step_budget() -> Result<()> {
    let mut env = line_of_five();
    for _ in 0..14 {
        env.step_numeric(0)?;
    }
    assert_eq!(env.reset(), 0);
    let (_, _, done) = env.step_numeric(0)?;
    assert!(!done);
    assert_eq!(env.steps_taken(), 1);
    Ok(())
}

#[test]
fn test_contract_violations_fail_fast() -> Result<()> {
    let mut env = line_of_five();
    let mut agent = QLearningAgent::from_seed(5, 2, AgentParameter::default(), common::SEED)?;

    let err = env.step_numeric(2).unwrap_err();
    assert_eq!(err, QlError::InvalidAction { action: 2, action_space: 2 });
    assert_eq!(env.state(), 0);

    assert!(matches!(agent.choose_action(5), Err(QlError::StateOutOfRange { .. })));
    assert!(matches!(agent.learn(5, 0, -1.0, 4, false), Err(QlError::StateOutOfRange { .. })));
    assert!(matches!(agent.learn(4, 3, -1.0, 4, false), Err(QlError::InvalidAction { .. })));
    assert!(matches!(LineEnvironment::with_length(1), Err(QlError::InvalidConfig(_))));
    Ok(())
}
