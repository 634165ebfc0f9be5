#![no_std]

pub mod board;
pub mod config;
pub mod hardware;
pub mod platform;
pub mod tasks;
