pub mod format;
pub mod progress;

pub use format::{format_duration, format_elapsed, format_timestamp};
pub use progress::{create_spinner, with_spinner};
