//! Utility module

pub mod units;
