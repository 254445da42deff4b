#![allow(dead_code)]

pub mod config;
pub mod mock_runway;
pub mod server;
