use iced::widget::text::Wrapping;
use iced::widget::{button, column, text, Column};
use iced::Length;

use crate::message::Message;
use crate::model::history::StudyHistory;

/// Most-recent-first list of previously viewed studies.
pub fn recent_list(history: &StudyHistory) -> Column<'static, Message> {
    let mut root = column![text("Recently Viewed").size(20)];

    if history.entries().is_empty() {
        return root.push(text("No recently viewed studies")).spacing(6);
    }

    for (index, entry) in history.entries().iter().enumerate() {
        let description = if entry.description.is_empty() {
            entry.study_instance_uid.as_str()
        } else {
            entry.description.as_str()
        };
        let label = format!(
            "{}: {description} ({})",
            entry.patient_name, entry.study_date
        );
        root = root.push(
            button(text(label).wrapping(Wrapping::Word).width(Length::Fill))
                .on_press(Message::OpenRecent(index)),
        );
    }

    root.spacing(6)
}
