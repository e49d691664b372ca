pub mod auth;
pub mod config;
pub mod db;
pub mod graph;
pub mod state;
