use crate::message::Message;
use crate::model::SidebarMode;
use iced::border::{Border, Radius};
use iced::widget::text::Wrapping;
use iced::widget::{button, container, row, text, Container};
use iced::{Alignment, Background, Color, Length, Shadow, Theme};

/// Pill-style two-segment switch between the study tree and the recents list.
pub fn sidebar_mode_toggle(current: SidebarMode) -> Container<'static, Message> {
    let toggle_row = row![
        segment("Studies", SidebarMode::Studies, current, SegmentPosition::Left)
            .width(Length::FillPortion(1)),
        segment("Recent", SidebarMode::Recent, current, SegmentPosition::Right)
            .width(Length::FillPortion(1)),
    ]
    .spacing(0);

    container(toggle_row)
        .padding(3)
        .width(Length::Fill)
        .style(pill_container_style)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentPosition {
    Left,
    Right,
}

fn segment(
    label: &str,
    mode: SidebarMode,
    current: SidebarMode,
    position: SegmentPosition,
) -> iced::widget::Button<'_, Message> {
    let is_active = mode == current;
    let content = container(text(label).size(14).wrapping(Wrapping::None))
        .width(Length::Fill)
        .height(Length::Fixed(32.0))
        .align_x(Alignment::Center)
        .align_y(Alignment::Center)
        .padding([6, 16]);

    button(content)
        .padding(0)
        .on_press(Message::SetSidebarMode(mode))
        .style(move |theme, status| segment_style(theme, status, is_active, position))
}

fn pill_container_style(theme: &Theme) -> iced::widget::container::Style {
    let palette = theme.extended_palette();

    iced::widget::container::Style {
        background: Some(Background::Color(palette.background.strong.color)),
        border: Border {
            color: palette.background.strong.color.scale_alpha(0.6),
            width: 1.0,
            radius: Radius::new(999.0),
        },
        ..Default::default()
    }
}

fn segment_style(
    theme: &Theme,
    status: iced::widget::button::Status,
    is_active: bool,
    position: SegmentPosition,
) -> iced::widget::button::Style {
    let palette = theme.extended_palette();

    let mut background_color = if is_active {
        palette.primary.strong.color
    } else {
        palette.background.strong.color.scale_alpha(0.4)
    };

    match status {
        iced::widget::button::Status::Hovered | iced::widget::button::Status::Pressed => {
            background_color = if is_active {
                palette.primary.base.color
            } else {
                palette.background.base.color.scale_alpha(0.8)
            };
        }
        iced::widget::button::Status::Disabled => {
            background_color = background_color.scale_alpha(0.5);
        }
        iced::widget::button::Status::Active => {}
    }

    let text_color = if is_active {
        palette.primary.strong.text
    } else {
        palette.background.base.text
    };

    let radius = match position {
        SegmentPosition::Left => Radius {
            top_left: 999.0,
            top_right: 10.0,
            bottom_right: 10.0,
            bottom_left: 999.0,
        },
        SegmentPosition::Right => Radius {
            top_left: 10.0,
            top_right: 999.0,
            bottom_right: 999.0,
            bottom_left: 10.0,
        },
    };

    iced::widget::button::Style {
        background: Some(Background::Color(background_color)),
        text_color,
        border: Border {
            color: Color::TRANSPARENT,
            width: 0.0,
            radius,
        },
        shadow: Shadow::default(),
    }
}
