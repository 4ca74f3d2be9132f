pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod host;
pub mod input;
pub mod menu;
pub mod mount;
pub mod pause;
pub mod prefs;
pub mod registry;
pub mod scheduler;
pub mod score;
pub mod storage;
