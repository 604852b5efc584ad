use iced::widget::text::Wrapping;
use iced::widget::{column, row, scrollable, text};
use iced::{Element, Length};

use crate::message::Message;
use crate::model::StudySession;

/// Element table for the current instance.
pub fn metadata_panel(session: &StudySession) -> Element<'_, Message> {
    let Some(instance) = session.current_instance() else {
        return if session.studies().is_empty() {
            text("Import DICOM studies to view their metadata").into()
        } else {
            text("Select an instance from the tree to inspect metadata").into()
        };
    };

    let mut table = column![row![
        text("Tag").width(Length::FillPortion(1)),
        text("VR").width(Length::FillPortion(1)),
        text("Alias").width(Length::FillPortion(2)),
        text("Value").width(Length::FillPortion(4)),
    ]
    .spacing(12)];

    for entry in &instance.metadata {
        table = table.push(
            row![
                text(&entry.tag).width(Length::FillPortion(1)),
                text(&entry.vr).width(Length::FillPortion(1)),
                text(&entry.alias).width(Length::FillPortion(2)),
                text(&entry.value)
                    .width(Length::FillPortion(4))
                    .wrapping(Wrapping::Word),
            ]
            .spacing(12),
        );
    }

    let header = match (instance.rows, instance.columns) {
        (Some(rows), Some(columns)) => format!(
            "File: {} ({columns}×{rows})",
            instance.file_path.display()
        ),
        _ => format!("File: {}", instance.file_path.display()),
    };

    column![text(header).size(16), scrollable(table.spacing(8))]
        .spacing(12)
        .into()
}
