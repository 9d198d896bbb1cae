use iced::widget::{button, column, container, horizontal_space, row, text};
use iced::{Alignment, Element, Length};

use super::MUTED;
use crate::Message;

/// Photo chooser screen
pub fn view<'a>() -> Element<'a, Message> {
    let close = row![horizontal_space(), button(text("✕")).on_press(Message::GoHome)];

    let prompt = column![
        text("📷").size(56),
        text("识别流浪猫").size(32),
        text("拍摄或上传照片，AI 将自动识别猫咪特征并建立档案。").color(MUTED),
        button(text("从相册选择").size(18))
            .on_press(Message::PickPhoto)
            .padding(14),
    ]
    .spacing(20)
    .align_x(Alignment::Center);

    column![
        close,
        container(prompt)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill),
    ]
    .padding(24)
    .into()
}
