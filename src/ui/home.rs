use iced::widget::{button, column, container, mouse_area, row, scrollable, text, text_input};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;

use super::{ACCENT, DANGER, MUTED};
use crate::photo::PhotoCache;
use crate::state::controller::Controller;
use crate::state::data::{CatProfile, CatStatus};
use crate::state::library::Library;
use crate::Message;

const CARD_WIDTH: f32 = 260.0;

/// List + search screen
pub fn view<'a>(
    controller: &'a Controller,
    library: &'a Library,
    photos: &'a PhotoCache,
) -> Element<'a, Message> {
    let search = text_input("搜索猫咪昵称、地点或毛色...", controller.search_term())
        .on_input(Message::SearchChanged)
        .padding(10);

    let cats = controller.visible(library);
    let content: Element<'a, Message> = if cats.is_empty() {
        empty_state(library.is_empty())
    } else {
        let cards: Vec<Element<'a, Message>> =
            cats.into_iter().map(|cat| card(cat, photos)).collect();

        scrollable(Wrap::with_elements(cards).spacing(16.0).line_spacing(16.0))
            .height(Length::Fill)
            .into()
    };

    column![
        super::header("XMUCat 厦大猫咪图鉴", false),
        search,
        container(content).height(Length::Fill),
        bottom_nav(),
    ]
    .spacing(12)
    .padding(16)
    .into()
}

/// One grid card; clicking it opens the detail view
fn card<'a>(cat: &'a CatProfile, photos: &'a PhotoCache) -> Element<'a, Message> {
    let sick_badge = (cat.status == CatStatus::Sick)
        .then(|| text(CatStatus::Sick.label()).size(12).color(DANGER));

    let title = row![text(cat.name.as_str()).size(18)]
        .push_maybe(sick_badge)
        .spacing(8)
        .align_y(Alignment::Center);

    let tags = row![
        text(cat.breed.as_str()).size(12).color(ACCENT),
        text(cat.estimated_age.as_str()).size(12).color(MUTED),
    ]
    .spacing(8);

    let body = column![
        super::photo(photos, &cat.image_url, 160.0),
        title,
        text(format!("📍 {}", cat.location)).size(14).color(MUTED),
        tags,
    ]
    .spacing(6)
    .width(Length::Fixed(CARD_WIDTH));

    mouse_area(container(body).padding(10).style(container::rounded_box))
        .on_press(Message::Select(cat.id.clone()))
        .into()
}

/// Shown when nothing matches; `no_profiles` distinguishes an empty catalog from a failed search
fn empty_state<'a>(no_profiles: bool) -> Element<'a, Message> {
    let title = if no_profiles {
        "还没有流浪猫档案"
    } else {
        "没有找到匹配的猫咪"
    };

    let content = column![
        text("📷").size(48),
        text(title).size(22),
        text("如果你在校园里遇到了流浪猫，点击下方按钮来登记第一只猫咪吧！").color(MUTED),
        button(text("开始识别")).on_press(Message::Register).padding(10),
    ]
    .spacing(12)
    .align_x(Alignment::Center);

    container(content)
        .width(Length::Fill)
        .padding(48)
        .center_x(Length::Fill)
        .into()
}

fn bottom_nav<'a>() -> Element<'a, Message> {
    let nav = row![
        button(text("首页")).on_press(Message::GoHome),
        button(text("＋ 登记")).on_press(Message::Register).padding(12),
        // Accounts are not available yet
        button(text("我的")),
    ]
    .spacing(48)
    .align_y(Alignment::Center);

    container(nav).center_x(Length::Fill).into()
}
