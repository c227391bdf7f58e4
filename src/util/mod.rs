pub mod logger;
mod math;

pub use math::{delta_secs, round_to};
