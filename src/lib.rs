pub mod agent;
pub mod calendar;
pub mod chat;
pub mod cli;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod server;
