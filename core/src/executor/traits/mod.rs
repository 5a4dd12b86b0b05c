pub mod observer;
pub mod processor;
pub mod strategy;

pub use observer::*;
pub use processor::*;
pub use strategy::*;
