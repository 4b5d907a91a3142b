pub mod config;
pub mod structs;
pub mod ui;

pub mod dispatch;
pub mod record;
pub mod scenario;
