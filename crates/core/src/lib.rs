#![deny(warnings)]

pub mod classify;
pub mod config;
pub mod engine;
pub mod events;
pub mod features;
pub mod realtime;
pub mod sink;
pub mod store;
pub mod turn;
