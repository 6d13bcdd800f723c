use iced::border::Border;
use iced::widget::{button, column, container, image, pick_list, row, text, text_input, Space};
use iced::{Alignment, ContentFit, Element, Length, Theme};

use pathcam_core::pipeline::monitor_session::SessionStatus;

use crate::app::Message;
use crate::settings::DisplayMode;
use crate::theme::status_color;

const ADDRESS_PLACEHOLDER: &str = "http://192.168.4.1:81/stream";
const VIDEO_PLACEHOLDER: &str = "Enter a stream address and press Start";

pub struct MonitorView<'a> {
    pub address: &'a str,
    pub running: bool,
    pub mode: DisplayMode,
    pub status: SessionStatus,
    pub frame: Option<&'a image::Handle>,
    pub detail: Option<&'a str>,
}

pub fn view(state: MonitorView<'_>) -> Element<'_, Message> {
    let address = text_input(ADDRESS_PLACEHOLDER, state.address)
        .on_input(Message::AddressChanged)
        .on_submit_maybe((!state.running).then_some(Message::Start))
        .padding(8)
        .size(14);

    let start = button(text("Start").size(14))
        .on_press_maybe((!state.running).then_some(Message::Start))
        .padding([8, 18])
        .style(button::primary);
    let stop = button(text("Stop").size(14))
        .on_press_maybe(state.running.then_some(Message::Stop))
        .padding([8, 18])
        .style(button::secondary);

    let controls = row![address, start, stop]
        .spacing(8)
        .align_y(Alignment::Center);

    let status = state.status;
    let status_row = row![
        text("Mode").size(13),
        pick_list(DisplayMode::ALL, Some(state.mode), Message::ModeChanged).text_size(13),
        Space::new().width(Length::Fill),
        text(status.to_string())
            .size(13)
            .style(move |theme: &Theme| text::Style {
                color: Some(status_color(theme, status)),
            }),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    let video: Element<'_, Message> = match state.frame {
        Some(handle) => image(handle.clone())
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        None => text(VIDEO_PLACEHOLDER).size(14).into(),
    };
    let video_area = container(video)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .style(|theme: &Theme| {
            let palette = theme.extended_palette();
            container::Style {
                background: Some(palette.background.weak.color.into()),
                border: Border {
                    radius: 8.0.into(),
                    width: 1.0,
                    color: palette.background.strong.color,
                },
                ..container::Style::default()
            }
        });

    let mut layout = column![controls, status_row, video_area].spacing(12);
    if let Some(detail) = state.detail {
        layout = layout.push(text(detail.to_string()).size(12));
    }
    layout.height(Length::Fill).into()
}
