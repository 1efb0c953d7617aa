use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use line_world_ql::environment::line_environment::{LineAction, LineEnvironment, LineEnvironmentParameter};
use line_world_ql::ql::learn::q_learning_agent::{AgentParameter, QLearningAgent};
use line_world_ql::ql::learn::self_driving_q_learner::{Parameter, SelfDrivingQLearner};
use line_world_ql::ql::prelude::{Action, DebugVisualizer, Environment};
use line_world_ql::util::log::init_logging;

/// Trains a Q-learning agent to walk to the end of a line of cells.
#[derive(Parser, Debug)]
#[command(name = "line-world-q-learning")]
struct Cli {
    /// Number of cells; the goal is the last one
    #[arg(long, default_value_t = 50)]
    length: usize,

    /// Cell the agent starts every episode on
    #[arg(long, default_value_t = 0)]
    start_state: usize,

    /// Number of episodes to learn
    #[arg(long, default_value_t = 1)]
    episodes: usize,

    /// Seed for the exploration random generator (entropy if absent)
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 0.1)]
    alpha: f32,

    #[arg(long, default_value_t = 0.9)]
    gamma: f32,

    /// Initial probability of taking a random action
    #[arg(long, default_value_t = 0.3)]
    epsilon: f64,

    /// Factor applied to epsilon after every episode
    #[arg(long, default_value_t = 0.99)]
    epsilon_decay: f64,

    /// Drive the learner one step at a time, pausing that many milliseconds and drawing the line after each step
    #[arg(long)]
    animate_ms: Option<u64>,

    /// Print the learned action values when done
    #[arg(long)]
    show_q_table: bool,
}

fn build_learner(cli: &Cli) -> Result<SelfDrivingQLearner<LineEnvironment>> {
    let environment = LineEnvironment::new(LineEnvironmentParameter {
        length: cli.length,
        start_state: cli.start_state,
        ..LineEnvironmentParameter::default()
    })?;

    let agent_param = AgentParameter {
        alpha: cli.alpha,
        gamma: cli.gamma,
        epsilon: cli.epsilon,
    };
    let n_states = environment.state_space();
    let n_actions = LineAction::ACTION_SPACE as usize;
    let agent = match cli.seed {
        Some(seed) => QLearningAgent::from_seed(n_states, n_actions, agent_param, seed)?,
        None => QLearningAgent::from_entropy(n_states, n_actions, agent_param)?,
    };

    let param = Parameter {
        epsilon_decay_rate: cli.epsilon_decay,
        ..Parameter::default()
    };
    SelfDrivingQLearner::new(environment, agent, param)
}

fn status_line(learner: &SelfDrivingQLearner<LineEnvironment>) -> String {
    let env = learner.environment();
    let mut line = format!(
        "episode: {} | position: {} | goal: {} | 𝜀={:.3}",
        learner.episode_count(),
        env.state(),
        env.goal_state(),
        learner.agent().epsilon()
    );
    if let Some(last) = learner.last_transition() {
        let action = LineAction::try_from_numeric(last.action).map(|a| a.to_string()).unwrap_or_default();
        line.push_str(&format!(
            " | last reward: {:.1} | last action: {} | steps: {}",
            last.reward, action, last.step_count
        ));
    }
    line
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let mut learner = build_learner(&cli)?;

    match cli.animate_ms {
        Some(delay_ms) => {
            let delay = Duration::from_millis(delay_ms);
            let target = learner.episode_count() + cli.episodes;
            while learner.episode_count() < target {
                learner.learn_step()?;
                println!("{}  {}", learner.environment().render_to_console(), status_line(&learner));
                thread::sleep(delay);
            }
        }
        None => {
            learner.learn_episodes(cli.episodes)?;
        }
    }

    println!("{}", learner.environment().render_to_console());
    println!("{}", status_line(&learner));
    log::info!("running reward: {:.2}", learner.running_reward());

    if cli.show_q_table {
        print!("{}", learner.agent().q_table());
        let policy: String = learner
            .agent()
            .greedy_policy()
            .into_iter()
            .map(|a| LineAction::try_from_numeric(a).map(|a| a.to_string()).unwrap_or_default())
            .collect();
        println!("greedy policy: {}", policy);
    }

    Ok(())
}
