mod args;
mod runner;

pub(crate) use args::{AnimationAction, Cli, Commands};
pub(crate) use runner::run;
