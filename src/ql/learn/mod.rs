pub mod history_buffer;
pub mod q_learning_agent;
pub mod self_driving_q_learner;
