// src/traffic/mod.rs
mod distribution;
mod verifier;

pub use distribution::{check_distribution, expected_share, tally, DistributionReport};
pub use verifier::TrafficVerifier;
