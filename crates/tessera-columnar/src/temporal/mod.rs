//! Calendar values packed into fixed-width integers.
//!
//! Each packed type defines a fixed bit layout ordered by significance
//! (larger calendar fields in higher bits), so plain integer comparison of
//! the packed bits agrees with chronological order. Arithmetic operates
//! directly on the packed representation; no intermediate calendar object is
//! ever built.
//!
//! The all-ones bit pattern of each width is the missing sentinel.

mod date;
mod datetime;
mod instant;
mod time;

pub use date::PackedDate;
pub use datetime::PackedDateTime;
pub use instant::PackedInstant;
pub use time::{PackedTime, TimeUnit};
