//! Module for finding when a photo was taken.
mod logic;
mod parsing;
pub mod structs;

pub use logic::get_capture_time;
pub use parsing::{parse_naive, parse_offset_string};
