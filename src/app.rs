use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use iced::widget::image::Handle;
use iced::widget::text::Wrapping;
use iced::widget::{button, column, container, row, scrollable, text};
use iced::{application, Alignment, Element, Length, Task, Theme};
use rfd::AsyncFileDialog;

use crate::image_pipeline::FramePreview;
use crate::message::Message;
use crate::model::error::ResolveError;
use crate::model::history::{RecentStudy, StudyHistory, StudySource};
use crate::model::loader::{load_studies_from_directory, load_studies_from_files, LoadReport};
use crate::model::resolver::{self, MemoryStudyCache, Resolution, SavedHandleStore, StudyCache};
use crate::model::{SidebarMode, StudySession, TreeNodeKey};
use crate::views::{instance_panel, metadata_panel, recent_list, study_tree};

const APP_TITLE: &str = "Dicompass";

pub fn run() -> iced::Result {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .try_init();

    application(APP_TITLE, App::update, App::view)
        .theme(App::theme)
        .run()
}

pub struct App {
    session: StudySession,
    cache: MemoryStudyCache,
    handles: SavedHandleStore,
    history: StudyHistory,
    collapsed_nodes: BTreeSet<TreeNodeKey>,
    sidebar_mode: SidebarMode,
    preview: Option<Handle>,
    preview_sop_uid: Option<String>,
}

impl Default for App {
    fn default() -> Self {
        Self {
            session: StudySession::new(),
            cache: MemoryStudyCache::default(),
            handles: SavedHandleStore::load(&handles_file()),
            history: StudyHistory::load(&history_file()),
            collapsed_nodes: BTreeSet::new(),
            sidebar_mode: SidebarMode::default(),
            preview: None,
            preview_sop_uid: None,
        }
    }
}

fn state_dir() -> PathBuf {
    std::env::var_os("DICOMPASS_STATE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn history_file() -> PathBuf {
    state_dir().join("dicompass_history.json")
}

fn handles_file() -> PathBuf {
    state_dir().join("dicompass_handles.json")
}

impl App {
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickFiles => Task::perform(
                async {
                    match AsyncFileDialog::new().pick_files().await {
                        Some(handles) if !handles.is_empty() => {
                            let paths = handles
                                .into_iter()
                                .map(|handle| handle.path().to_path_buf())
                                .collect();
                            load_studies_from_files(paths)
                        }
                        _ => LoadReport::default(),
                    }
                },
                Message::FilesLoaded,
            ),
            Message::FilesLoaded(report) => {
                if report.failures.is_empty() {
                    if self.session.error().is_some() {
                        self.session.set_error(None);
                    }
                } else {
                    self.session.set_error(Some(report.failures.join("\n")));
                }

                if report.studies.is_empty() {
                    return Task::none();
                }

                if self.session.studies().is_empty() {
                    self.session.set_studies(report.studies);
                } else {
                    // Incremental import: the user keeps their place.
                    for study in report.studies {
                        self.session.add_study(study);
                    }
                }
                self.refresh_preview()
            }
            Message::PickFolder => Task::perform(
                async {
                    AsyncFileDialog::new()
                        .pick_folder()
                        .await
                        .map(|handle| handle.path().to_path_buf())
                },
                Message::FolderChosen,
            ),
            Message::FolderChosen(None) => Task::none(),
            Message::FolderChosen(Some(path)) => {
                self.session.set_loading(true);
                Task::perform(
                    async move {
                        let result =
                            load_studies_from_directory(&path).map_err(|err| err.to_string());
                        (path, result)
                    },
                    |(path, result)| Message::FolderLoaded { path, result },
                )
            }
            Message::FolderLoaded { path, result } => {
                self.session.set_loading(false);
                match result {
                    Ok(report) => {
                        if report.failures.is_empty() {
                            self.session.set_error(None);
                        } else {
                            self.session.set_error(Some(report.failures.join("\n")));
                        }
                        if report.studies.is_empty() {
                            self.session.set_error(Some(format!(
                                "No DICOM studies found under {}",
                                path.display()
                            )));
                            return Task::none();
                        }

                        let key = path.display().to_string();
                        self.cache.put(&key, report.studies.clone());
                        self.handles.register(&key, path.clone());
                        self.handles.save(&handles_file());
                        self.session.set_studies(report.studies);
                        self.remember_loaded_studies(&path);
                        self.refresh_preview()
                    }
                    Err(message) => {
                        self.session.set_error(Some(message));
                        Task::none()
                    }
                }
            }
            Message::SelectStudy(uid) => {
                self.session.set_current_study(&uid);
                self.refresh_preview()
            }
            Message::SelectSeries(uid) => {
                self.session.set_current_series(&uid);
                self.refresh_preview()
            }
            Message::SelectInstance { series_uid, index } => {
                self.session.set_current_series(&series_uid);
                self.session.set_current_instance(index as i64);
                self.refresh_preview()
            }
            Message::NextInstance => {
                self.session.next_instance();
                self.refresh_preview()
            }
            Message::PreviousInstance => {
                self.session.previous_instance();
                self.refresh_preview()
            }
            Message::ToggleNode(key) => {
                if !self.collapsed_nodes.remove(&key) {
                    self.collapsed_nodes.insert(key);
                }
                Task::none()
            }
            Message::SetSidebarMode(mode) => {
                if self.sidebar_mode != mode {
                    self.sidebar_mode = mode;
                }
                Task::none()
            }
            Message::OpenRecent(index) => {
                let Some(entry) = self.history.entries().get(index).cloned() else {
                    return Task::none();
                };
                match resolver::resolve(&entry, &mut self.session, &self.cache, &self.handles) {
                    Ok(Resolution::AlreadyLoaded | Resolution::FromCache) => self.refresh_preview(),
                    Ok(Resolution::Reload { path, cache_key }) => {
                        self.session.set_loading(true);
                        let study_uid = entry.study_instance_uid;
                        Task::perform(
                            async move {
                                let result =
                                    load_studies_from_directory(&path).map_err(|err| {
                                        ResolveError::Reload {
                                            path: path.clone(),
                                            source: err,
                                        }
                                        .to_string()
                                    });
                                (study_uid, cache_key, path, result)
                            },
                            |(study_uid, cache_key, path, result)| Message::RecentReloaded {
                                study_uid,
                                cache_key,
                                path,
                                result,
                            },
                        )
                    }
                    Err(err) => {
                        self.session.set_error(Some(err.to_string()));
                        Task::none()
                    }
                }
            }
            Message::RecentReloaded {
                study_uid,
                cache_key,
                path,
                result,
            } => {
                self.session.set_loading(false);
                match result {
                    Ok(report) => match resolver::apply_reload(
                        &mut self.session,
                        &mut self.cache,
                        &study_uid,
                        &cache_key,
                        &path,
                        report,
                    ) {
                        Ok(()) => self.refresh_preview(),
                        Err(err) => {
                            self.session.set_error(Some(err.to_string()));
                            Task::none()
                        }
                    },
                    Err(detail) => {
                        log::error!("Reload of study {study_uid} failed: {detail}");
                        self.session.set_error(Some(detail));
                        Task::none()
                    }
                }
            }
            Message::PreviewRendered { sop_uid, result } => {
                let current = self
                    .session
                    .current_instance()
                    .map(|instance| instance.sop_instance_uid.clone());
                // A newer selection may have raced this decode; last write wins.
                if current.as_deref() != Some(sop_uid.as_str()) {
                    return Task::none();
                }
                match result {
                    Ok(handle) => self.preview = handle,
                    Err(err) => {
                        log::warn!("Unable to build frame preview: {err}");
                        self.preview = None;
                    }
                }
                self.preview_sop_uid = Some(sop_uid);
                Task::none()
            }
            Message::DismissError => {
                self.session.set_error(None);
                Task::none()
            }
            Message::CloseAll => {
                self.session.reset();
                self.collapsed_nodes.clear();
                self.preview = None;
                self.preview_sop_uid = None;
                Task::none()
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let mut toolbar = row![
            button("Import DICOM Files").on_press(Message::PickFiles),
            button("Open Study Folder").on_press(Message::PickFolder),
            button("Close All").on_press(Message::CloseAll),
        ]
        .spacing(12);
        if self.session.is_loading() {
            toolbar = toolbar.push(text("Loading…"));
        }

        let sidebar_content: Element<'_, Message> = match self.sidebar_mode {
            SidebarMode::Studies => study_tree(&self.session, &self.collapsed_nodes).into(),
            SidebarMode::Recent => recent_list(&self.history).into(),
        };
        let sidebar = container(
            column![
                crate::components::sidebar_mode_toggle(self.sidebar_mode),
                scrollable(sidebar_content),
            ]
            .spacing(12),
        )
        .padding(16)
        .width(Length::FillPortion(2));

        let metadata = container(metadata_panel(&self.session))
            .padding(16)
            .width(Length::FillPortion(5));

        let viewer = container(instance_panel(&self.session, self.preview.as_ref()))
            .padding(16)
            .width(Length::FillPortion(3))
            .height(Length::Fill)
            .align_x(Alignment::Center)
            .align_y(Alignment::Center);

        let mut content = column![row![sidebar, metadata, viewer]
            .spacing(16)
            .width(Length::Fill)
            .height(Length::Fill)]
        .spacing(16);

        if let Some(error) = self.session.error() {
            content = content.push(
                row![
                    text(error).size(16).wrapping(Wrapping::Word),
                    button("Dismiss").on_press(Message::DismissError),
                ]
                .spacing(12)
                .align_y(Alignment::Center),
            );
        }

        column![toolbar, content]
            .padding(20)
            .spacing(20)
            .align_x(Alignment::Start)
            .into()
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    /// Schedules a first-frame decode for the current instance, unless the
    /// shown preview already belongs to it.
    fn refresh_preview(&mut self) -> Task<Message> {
        let Some(instance) = self.session.current_instance() else {
            self.preview = None;
            self.preview_sop_uid = None;
            return Task::none();
        };

        let sop_uid = instance.sop_instance_uid.clone();
        if self.preview_sop_uid.as_deref() == Some(sop_uid.as_str()) {
            return Task::none();
        }

        let path = instance.file_path.clone();
        Task::perform(
            async move {
                let result = FramePreview::render_file(&path);
                (sop_uid, result)
            },
            |(sop_uid, result)| Message::PreviewRendered { sop_uid, result },
        )
    }

    fn remember_loaded_studies(&mut self, folder: &Path) {
        for study in self.session.studies() {
            self.history.record(RecentStudy {
                study_instance_uid: study.study_instance_uid.clone(),
                patient_name: study.patient_name.clone(),
                description: study.description.clone(),
                study_date: study.study_date.clone(),
                source: StudySource::Folder(folder.to_path_buf()),
            });
        }
        self.history.save(&history_file());
    }
}
