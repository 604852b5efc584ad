use std::collections::BTreeSet;

use iced::widget::text::Wrapping;
use iced::widget::{button, column, row, text, Column, Space};
use iced::Length;

use crate::message::Message;
use crate::model::{Series, Study, StudySession, TreeNodeKey};

const INDENT: f32 = 18.0;

/// Collapsible study → series → instance tree over the session read model.
pub fn study_tree<'a>(
    session: &'a StudySession,
    collapsed: &BTreeSet<TreeNodeKey>,
) -> Column<'a, Message> {
    let mut root = column![text("Loaded Studies").size(20)];

    if session.studies().is_empty() {
        return root.push(text("No studies loaded")).spacing(6);
    }

    let arrow = |is_collapsed: bool| if is_collapsed { "▶" } else { "▼" };
    let selection = session.selection();

    for (study_idx, study) in session.studies().iter().enumerate() {
        let study_key = TreeNodeKey::study(&study.study_instance_uid);
        let study_collapsed = collapsed.contains(&study_key);
        let is_current_study = selection.map(|s| s.study) == Some(study_idx);

        root = root.push(row![
            button(text(arrow(study_collapsed))).on_press(Message::ToggleNode(study_key)),
            button(
                text(study_label(study, is_current_study))
                    .wrapping(Wrapping::Word)
                    .width(Length::Fill)
            )
            .on_press(Message::SelectStudy(study.study_instance_uid.clone())),
        ]);

        if study_collapsed {
            continue;
        }

        for (series_idx, series) in study.series.iter().enumerate() {
            let series_key =
                TreeNodeKey::series(&study.study_instance_uid, &series.series_instance_uid);
            let series_collapsed = collapsed.contains(&series_key);
            let is_current_series =
                is_current_study && selection.map(|s| s.series) == Some(series_idx);

            root = root.push(row![
                Space::with_width(Length::Fixed(INDENT)),
                button(text(arrow(series_collapsed))).on_press(Message::ToggleNode(series_key)),
                button(
                    text(series_label(series, is_current_series))
                        .wrapping(Wrapping::Word)
                        .width(Length::Fill)
                )
                .on_press(Message::SelectSeries(series.series_instance_uid.clone())),
            ]);

            if series_collapsed {
                continue;
            }

            for (instance_idx, instance) in series.instances.iter().enumerate() {
                let is_current_instance =
                    is_current_series && selection.map(|s| s.instance) == Some(instance_idx);
                let label = if is_current_instance {
                    format!("▶ Instance {}", instance.instance_number)
                } else {
                    format!("Instance {}", instance.instance_number)
                };
                root = root.push(row![
                    Space::with_width(Length::Fixed(INDENT * 2.0)),
                    button(text(label)).on_press(Message::SelectInstance {
                        series_uid: series.series_instance_uid.clone(),
                        index: instance_idx,
                    }),
                ]);
            }
        }
    }

    root.spacing(6)
}

fn study_label(study: &Study, is_current: bool) -> String {
    let marker = if is_current { "● " } else { "" };
    let description = if study.description.is_empty() {
        &study.study_instance_uid
    } else {
        &study.description
    };
    format!(
        "{marker}{}: {description} ({})",
        study.patient_name, study.study_date
    )
}

fn series_label(series: &Series, is_current: bool) -> String {
    let marker = if is_current { "● " } else { "" };
    let description = if series.description.is_empty() {
        format!("Series {}", series.series_number)
    } else {
        series.description.clone()
    };
    format!(
        "{marker}[{}] {description} ({} image(s))",
        series.modality,
        series.instances.len()
    )
}
