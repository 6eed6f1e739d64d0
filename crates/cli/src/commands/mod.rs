pub mod ask;
pub mod config_cmd;
pub mod doctor;
pub mod onboard;
pub mod serve;
pub mod sessions;
