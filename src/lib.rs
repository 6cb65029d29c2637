pub mod audit;
pub mod cli;
pub mod config;
pub mod console;
pub mod events;
pub mod http;
pub mod nav;
pub mod panel;
pub mod utils;
pub mod web;
