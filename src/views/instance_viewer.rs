use iced::widget::image::Handle;
use iced::widget::{button, column, row, text, Image};
use iced::{Alignment, Element, Length};

use crate::message::Message;
use crate::model::StudySession;

/// Preview of the current instance with Previous/Next stepping.
pub fn instance_panel<'a>(
    session: &'a StudySession,
    preview: Option<&Handle>,
) -> Element<'a, Message> {
    let Some(series) = session.current_series() else {
        return text("Select an instance to preview its first frame").into();
    };

    let image_content: Element<'a, Message> = match preview {
        Some(handle) => Image::new(handle.clone())
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        None => text("No frame preview available").into(),
    };

    let index = session.current_instance_index();
    let total = series.instances.len();

    let controls = row![
        button("Previous").on_press_maybe((index > 0).then_some(Message::PreviousInstance)),
        text(format!("{} / {total}", index + 1)),
        button("Next").on_press_maybe((index + 1 < total).then_some(Message::NextInstance)),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    column![image_content, controls]
        .spacing(12)
        .align_x(Alignment::Center)
        .into()
}
