mod config;
mod timers;

pub use config::Config;
pub use timers::{Timers, run};
