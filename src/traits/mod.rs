pub mod worker;

pub use worker::{capabilities, CapabilitySet, Worker};
