/// Presentation views
///
/// One module per screen; each renders from the controller and library
/// and turns user input into `Message`s.

pub mod capture;
pub mod detail;
pub mod form;
pub mod home;

use iced::widget::{button, container, horizontal_space, image, row, text};
use iced::{Color, ContentFit, Element, Length};

use crate::photo::PhotoCache;
use crate::state::controller::{Controller, View};
use crate::state::data::CatStatus;
use crate::state::library::Library;
use crate::Message;

/// Brand blue used for titles and primary actions
pub const ACCENT: Color = Color::from_rgb(0.15, 0.39, 0.92);
pub const DANGER: Color = Color::from_rgb(0.86, 0.15, 0.15);
pub const MUTED: Color = Color::from_rgb(0.45, 0.5, 0.56);

/// Render the screen for the controller's current view
pub fn view<'a>(
    controller: &'a Controller,
    library: &'a Library,
    photos: &'a PhotoCache,
) -> Element<'a, Message> {
    match controller.view() {
        View::Home => home::view(controller, library, photos),
        View::AddPhoto => capture::view(),
        View::AddDetails | View::Edit(_) => form::view(controller, photos),
        View::Detail(_) => match controller.selected(library) {
            Some(cat) => detail::view(cat, photos),
            // The profile vanished underneath us; fall back to the list
            None => home::view(controller, library, photos),
        },
    }
}

/// Title bar with an optional back button
pub fn header<'a>(title: &'a str, show_back: bool) -> Element<'a, Message> {
    let back = show_back.then(|| button(text("‹ 返回")).on_press(Message::GoHome));

    row![]
        .push_maybe(back)
        .push(text(title).size(24).color(ACCENT))
        .push(horizontal_space())
        .spacing(12)
        .into()
}

/// A cat photo, or a text placeholder while it is missing or loading
pub fn photo<'a>(photos: &'a PhotoCache, url: &str, height: f32) -> Element<'a, Message> {
    match photos.get(url) {
        Some(handle) => image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fixed(height))
            .content_fit(ContentFit::Cover)
            .into(),
        None => container(text("无照片").color(MUTED))
            .width(Length::Fill)
            .height(Length::Fixed(height))
            .center_x(Length::Fill)
            .center_y(Length::Fixed(height))
            .style(container::rounded_box)
            .into(),
    }
}

/// Badge color for a status
pub fn status_color(status: CatStatus) -> Color {
    match status {
        CatStatus::Healthy => Color::from_rgb(0.08, 0.5, 0.24),
        CatStatus::Sick => DANGER,
        CatStatus::Injured => Color::from_rgb(0.76, 0.25, 0.05),
        CatStatus::Adopted => Color::from_rgb(0.11, 0.31, 0.85),
        CatStatus::Missing => Color::from_rgb(0.22, 0.25, 0.32),
        CatStatus::Unknown => MUTED,
    }
}
