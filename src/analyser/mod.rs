//! The core of capture comparison.
//! Load two packet logs, measure their arrival rates, and correlate packets across them by id.
pub mod utils;
pub mod core;
pub mod rate;
pub mod matching;
pub mod delay;
pub mod containers;
