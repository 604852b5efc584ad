/// Collapse key for a node in the study browser.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum TreeNodeKey {
    Study(String),
    Series { study: String, series: String },
}

impl TreeNodeKey {
    pub fn study(uid: &str) -> Self {
        Self::Study(uid.to_string())
    }

    pub fn series(study: &str, series: &str) -> Self {
        Self::Series {
            study: study.to_string(),
            series: series.to_string(),
        }
    }
}

/// Which list the sidebar shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SidebarMode {
    #[default]
    Studies,
    Recent,
}
