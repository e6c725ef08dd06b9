pub mod board;
pub mod config;
pub mod export;
pub mod feed;
pub mod format;
pub mod pipeline;
pub mod tui;
