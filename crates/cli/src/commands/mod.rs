pub mod aliases;
pub mod config_cmd;
pub mod daemon;
pub mod doctor;
pub mod onboard;
pub mod resolve;
