pub mod app;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod handlers;
pub mod list;
pub mod middleware;
pub mod options;
pub mod sdk;
pub mod views;

#[cfg(test)]
pub mod testing;
