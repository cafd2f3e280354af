pub mod commands;
pub mod constants;
pub mod display;
pub mod ui;
