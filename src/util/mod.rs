pub mod util;

pub use util::{engagement_rate, format_file_size};
