//! Core translation engine module

pub mod client;
pub mod config;
pub mod errors;
pub mod languages;
pub mod models;
pub mod request;
pub mod response;
pub mod tokens;
pub mod translation;
pub mod transport;
