use chrono::{Local, TimeZone};
use iced::widget::{button, column, container, horizontal_space, row, scrollable, text};
use iced::{Element, Length};

use super::{status_color, MUTED};
use crate::photo::PhotoCache;
use crate::state::data::CatProfile;
use crate::Message;

/// Read view of one profile
pub fn view<'a>(cat: &'a CatProfile, photos: &'a PhotoCache) -> Element<'a, Message> {
    let status = row![
        text(cat.status.label()).color(status_color(cat.status)),
        horizontal_space(),
        text(format!("📍 {}", cat.location)).color(MUTED),
    ];

    let attributes = column![
        row![
            attribute("品种", &cat.breed),
            attribute("年龄", &cat.estimated_age)
        ]
        .spacing(24),
        row![
            attribute("性别", cat.gender.label()),
            attribute("毛色", &cat.color)
        ]
        .spacing(24),
    ]
    .spacing(16);

    let actions = row![
        button(text("编辑"))
            .on_press(Message::StartEdit)
            .padding(10)
            .width(Length::Fill),
        button(text("删除"))
            .on_press(Message::DeleteRequested)
            .style(button::danger)
            .padding(10)
            .width(Length::Fill),
    ]
    .spacing(16);

    let footer = text(format!(
        "ID: {} • Last Update: {}",
        cat.id,
        format_date(cat.last_seen)
    ))
    .size(12)
    .color(MUTED);

    let page = column![
        super::header(&cat.name, true),
        super::photo(photos, &cat.image_url, 320.0),
        status,
        attributes,
        section("外貌特征", &cat.features),
        section("最近记录 / 备注", &cat.notes),
        actions,
        footer,
    ]
    .spacing(16)
    .padding(16)
    .max_width(720);

    scrollable(container(page).center_x(Length::Fill))
        .height(Length::Fill)
        .into()
}

fn attribute<'a>(label: &'a str, value: &'a str) -> Element<'a, Message> {
    column![text(label).size(12).color(MUTED), text(value).size(16)]
        .spacing(2)
        .width(Length::Fill)
        .into()
}

fn section<'a>(label: &'a str, body: &'a str) -> Element<'a, Message> {
    column![
        text(label).size(12).color(MUTED),
        container(text(body)).padding(10).style(container::rounded_box),
    ]
    .spacing(6)
    .into()
}

/// Local calendar date of a millisecond timestamp
fn format_date(timestamp_ms: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
