use iced::widget::{checkbox, column, pick_list, row, slider, text, Space};
use iced::{Alignment, Element};

use crate::app::Message;
use crate::settings::{Appearance, Settings, MAX_INTERVAL_MS, MIN_INTERVAL_MS};

pub fn view<'a>(settings: &Settings) -> Element<'a, Message> {
    let interval = settings.interval_ms as u32;
    let fps = 1000.0 / interval.max(1) as f32;

    column![
        text("Stream").size(16),
        Space::new().height(8),
        row![
            text("Read interval").size(13),
            slider(
                MIN_INTERVAL_MS as u32..=MAX_INTERVAL_MS as u32,
                interval,
                Message::IntervalChanged
            )
            .step(5u32),
            text(format!("{interval} ms (~{fps:.0} fps)")).size(13),
        ]
        .spacing(12)
        .align_y(Alignment::Center),
        Space::new().height(20),
        text("Theme").size(16),
        Space::new().height(8),
        row![
            text("Appearance").size(13),
            pick_list(Appearance::ALL, Some(settings.appearance), |a| {
                Message::AppearanceChanged(a)
            })
            .text_size(13),
        ]
        .spacing(12)
        .align_y(Alignment::Center),
        Space::new().height(12),
        checkbox(settings.high_contrast)
            .label("High contrast")
            .on_toggle(Message::HighContrastChanged)
            .text_size(13),
    ]
    .spacing(0)
    .into()
}
