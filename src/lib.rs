pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod fetch;
pub mod local;
pub mod normalize;
pub mod output;
pub mod source;
pub mod tui;
pub mod view;
