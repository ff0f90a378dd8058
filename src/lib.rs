#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod constants;
pub mod keep_alive;
pub mod network;
pub mod telemetry;
pub mod topic;
