use std::path::PathBuf;

use iced::widget::image::Handle;

use crate::model::loader::LoadReport;
use crate::model::{SidebarMode, TreeNodeKey};

#[derive(Debug, Clone)]
pub enum Message {
    PickFiles,
    PickFolder,
    FilesLoaded(LoadReport),
    FolderChosen(Option<PathBuf>),
    FolderLoaded {
        path: PathBuf,
        result: Result<LoadReport, String>,
    },
    SelectStudy(String),
    SelectSeries(String),
    SelectInstance {
        series_uid: String,
        index: usize,
    },
    NextInstance,
    PreviousInstance,
    ToggleNode(TreeNodeKey),
    SetSidebarMode(SidebarMode),
    OpenRecent(usize),
    RecentReloaded {
        study_uid: String,
        cache_key: String,
        path: PathBuf,
        result: Result<LoadReport, String>,
    },
    PreviewRendered {
        sop_uid: String,
        result: Result<Option<Handle>, String>,
    },
    DismissError,
    CloseAll,
}
