//! Control-law building blocks

pub mod pid;

pub use pid::{saturate, wrap, PidController, PidGains, PidInfo, NOMINAL_DT};
