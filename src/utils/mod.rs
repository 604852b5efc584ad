pub mod formatting;

pub use formatting::{element_rows, format_tag, value_to_string};
