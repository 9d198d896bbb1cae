use iced::widget::{button, column, container, pick_list, row, scrollable, text, text_input};
use iced::{Element, Length};

use super::{ACCENT, DANGER, MUTED};
use crate::photo::PhotoCache;
use crate::state::controller::{Controller, View};
use crate::state::data::{CatStatus, Gender};
use crate::state::draft::{CatDraft, DraftField};
use crate::Message;

/// New-profile and edit form
pub fn view<'a>(controller: &'a Controller, photos: &'a PhotoCache) -> Element<'a, Message> {
    let editing = matches!(controller.view(), View::Edit(_));
    let title = if editing { "编辑档案" } else { "登记新猫咪" };
    let draft = controller.draft();

    let preview = super::photo(photos, draft.image_url.as_deref().unwrap_or(""), 240.0);

    let analyzing = controller
        .is_analyzing()
        .then(|| text("AI 正在分析猫咪特征...").color(ACCENT));
    let error = controller
        .analysis_error()
        .map(|message| container(text(message).color(DANGER)).padding(12));
    let retry = (!editing && !controller.is_analyzing())
        .then(|| button(text("重新选择照片")).on_press(Message::PickPhoto));

    let selects = row![
        labeled(
            "性别",
            pick_list(
                Gender::ALL,
                Some(draft.gender.unwrap_or_default()),
                Message::GenderSelected,
            )
            .into(),
        ),
        labeled(
            "状态",
            pick_list(
                CatStatus::ALL,
                Some(draft.status.unwrap_or_default()),
                Message::StatusSelected,
            )
            .into(),
        ),
    ]
    .spacing(16);

    let analysis_fields = column![
        text("AI 分析数据").size(14).color(ACCENT),
        input(draft, DraftField::Breed, "品种", ""),
        input(draft, DraftField::Color, "花色", ""),
        input(draft, DraftField::EstimatedAge, "预估年龄", ""),
        input(draft, DraftField::Features, "特征描述", ""),
    ]
    .spacing(10);

    let save = button(text("保存档案"))
        .on_press_maybe(controller.can_save().then_some(Message::Save))
        .padding(12)
        .width(Length::Fill);

    let form = column![
        input(draft, DraftField::Name, "猫咪昵称 *", "例如：大白"),
        input(draft, DraftField::Location, "出没地点 *", "例如：芙蓉隧道"),
        selects,
        container(analysis_fields)
            .padding(12)
            .style(container::rounded_box),
        input(
            draft,
            DraftField::Notes,
            "备注 / 健康记录",
            "更多关于这只猫的细节...",
        ),
        save,
    ]
    .spacing(14);

    let page = column![super::header(title, true), preview]
        .push_maybe(analyzing)
        .push_maybe(retry)
        .push_maybe(error)
        .push(form)
        .spacing(12)
        .padding(16)
        .max_width(720);

    scrollable(container(page).center_x(Length::Fill))
        .height(Length::Fill)
        .into()
}

fn input<'a>(
    draft: &'a CatDraft,
    field: DraftField,
    label: &'a str,
    placeholder: &'a str,
) -> Element<'a, Message> {
    labeled(
        label,
        text_input(placeholder, draft.field(field))
            .on_input(move |value| Message::FieldChanged(field, value))
            .padding(8)
            .into(),
    )
}

fn labeled<'a>(label: &'a str, control: Element<'a, Message>) -> Element<'a, Message> {
    column![text(label).size(13).color(MUTED), control]
        .spacing(4)
        .into()
}
