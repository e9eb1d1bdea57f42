pub mod command;
pub mod config;
pub mod connection;
pub mod easing;
pub mod turn;

pub use command::*;
pub use config::SchedulerConfig;
pub use connection::*;
pub use easing::Easing;
pub use turn::Turn;
