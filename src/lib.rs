pub mod api;
pub mod commands;
pub mod config;
pub mod db;
pub mod display;
pub mod models;
pub mod session;
pub mod theme;
pub mod validate;
pub mod viewmodel;
pub mod votes;
