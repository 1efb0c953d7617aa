pub mod line_environment;
