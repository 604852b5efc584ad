pub mod instance_viewer;
pub mod metadata_panel;
pub mod recent_panel;
pub mod study_browser;

pub use instance_viewer::instance_panel;
pub use metadata_panel::metadata_panel;
pub use recent_panel::recent_list;
pub use study_browser::study_tree;
