pub mod segmented_toggle;

pub use segmented_toggle::sidebar_mode_toggle;
