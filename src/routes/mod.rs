//! Page route handlers

pub mod simulator;
