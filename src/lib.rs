// src/lib.rs
pub mod backend;
pub mod clients;
pub mod config;
pub mod error;
pub mod load_balancer;
pub mod names;
pub mod poll;
pub mod scenario;
pub mod traffic;

pub use error::{Result, ScenarioError};
