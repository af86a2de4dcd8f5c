pub mod app;
pub mod board_utils;
pub mod cells;
pub mod cli;
pub mod codec;
pub mod error;
pub mod logging;
pub mod matching;
pub mod settings;
pub mod store;
pub mod theme;
pub mod types;
pub mod ui;
