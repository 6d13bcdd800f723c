use std::path::Path;
use std::time::Duration;

use iced::widget::{button, column, container, image, row, text};
use iced::{Element, Length, Subscription, Task, Theme};

use pathcam_core::detection::domain::path_estimate::PathDetection;
use pathcam_core::detection::infrastructure::contour_path_detector::ContourPathDetector;
use pathcam_core::pipeline::monitor_session::{MonitorSession, SessionStatus, TickOutcome};
use pathcam_core::shared::constants::IMAGE_EXTENSIONS;
use pathcam_core::shared::frame::Frame;
use pathcam_core::video::domain::stream_source::StreamSource;
use pathcam_core::video::infrastructure::ffmpeg_stream_source::FfmpegStreamSource;
use pathcam_core::video::infrastructure::image_file_source::ImageFileSource;

use crate::settings::{Appearance, DisplayMode, Settings, MAX_INTERVAL_MS, MIN_INTERVAL_MS};
use crate::tabs;
use crate::theme;

const NETWORK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Monitor,
    Settings,
}

impl Tab {
    const ALL: &[Tab] = &[Tab::Monitor, Tab::Settings];

    fn label(self) -> &'static str {
        match self {
            Tab::Monitor => "Monitor",
            Tab::Settings => "Settings",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    TabSelected(Tab),
    AddressChanged(String),
    Start,
    Stop,
    Tick,
    ModeChanged(DisplayMode),
    IntervalChanged(u32),
    AppearanceChanged(Appearance),
    HighContrastChanged(bool),
    PollSystemTheme,
}

pub struct App {
    active_tab: Tab,
    pub settings: Settings,
    address: String,
    session: MonitorSession,
    frame: Option<image::Handle>,
    detail: Option<String>,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        (Self::with_settings(Settings::load()), Task::none())
    }

    fn with_settings(settings: Settings) -> Self {
        let session = MonitorSession::new(
            Box::new(FfmpegStreamSource::new()),
            Box::new(ContourPathDetector::default()),
            settings.mode.into(),
        );
        Self {
            active_tab: Tab::Monitor,
            address: settings.address.clone(),
            settings,
            session,
            frame: None,
            detail: None,
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                self.active_tab = tab;
            }
            Message::AddressChanged(address) => {
                self.address = address;
            }
            // Enter in the address field while streaming; Stop comes first.
            Message::Start if self.session.is_running() => {}
            Message::Start => {
                let address = self.address.trim().to_string();
                if !address.is_empty() {
                    self.session.set_source(source_for(&address));
                }
                if self.session.start(&address) == SessionStatus::Connected {
                    self.frame = None;
                    self.detail = None;
                    self.settings.address = address;
                    self.settings.save();
                }
            }
            Message::Stop => {
                self.session.stop();
                self.frame = None;
                self.detail = None;
            }
            Message::Tick => match self.session.tick() {
                Some(TickOutcome::Frame { frame, detection }) => {
                    self.frame = Some(frame_handle(&frame));
                    self.detail = detection.as_ref().and_then(describe);
                }
                Some(TickOutcome::ReadFailed(e)) => {
                    log::debug!("Tick skipped: {e}");
                }
                None => {}
            },
            Message::ModeChanged(mode) => {
                self.settings.mode = mode;
                self.session.set_mode(mode.into());
                self.detail = None;
                self.settings.save();
            }
            Message::IntervalChanged(ms) => {
                self.settings.interval_ms = (ms as u64).clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS);
                self.settings.save();
            }
            Message::AppearanceChanged(appearance) => {
                self.settings.appearance = appearance;
                self.settings.save();
            }
            Message::HighContrastChanged(enabled) => {
                self.settings.high_contrast = enabled;
                self.settings.save();
            }
            Message::PollSystemTheme => {
                // theme() re-resolves on every render.
            }
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let tab_bar = row(Tab::ALL
            .iter()
            .map(|&tab| {
                let btn = button(text(tab.label()).size(13))
                    .on_press(Message::TabSelected(tab))
                    .padding([6, 14]);
                if tab == self.active_tab {
                    btn.style(button::primary).into()
                } else {
                    btn.style(button::text).into()
                }
            })
            .collect::<Vec<_>>())
        .spacing(2);

        let content: Element<'_, Message> = match self.active_tab {
            Tab::Monitor => tabs::monitor_tab::view(tabs::monitor_tab::MonitorView {
                address: &self.address,
                running: self.session.is_running(),
                mode: self.settings.mode,
                status: self.session.status(),
                frame: self.frame.as_ref(),
                detail: self.detail.as_deref(),
            }),
            Tab::Settings => tabs::settings_tab::view(&self.settings),
        };

        column![
            tab_bar,
            container(content).padding(16).height(Length::Fill),
        ]
        .height(Length::Fill)
        .into()
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.settings.appearance, self.settings.high_contrast)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = Vec::new();
        if self.session.is_running() {
            let interval = Duration::from_millis(self.settings.interval_ms);
            subscriptions.push(iced::time::every(interval).map(|_| Message::Tick));
        }
        if self.settings.appearance == Appearance::System {
            subscriptions
                .push(iced::time::every(Duration::from_secs(2)).map(|_| Message::PollSystemTheme));
        }
        Subscription::batch(subscriptions)
    }
}

fn source_for(address: &str) -> Box<dyn StreamSource> {
    let is_image = Path::new(address)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false);
    if is_image {
        Box::new(ImageFileSource::new())
    } else {
        Box::new(FfmpegStreamSource::new().with_timeout(NETWORK_TIMEOUT))
    }
}

/// iced wants RGBA; frames are RGB.
fn frame_handle(frame: &Frame) -> image::Handle {
    image::Handle::from_rgba(frame.width(), frame.height(), rgba_bytes(frame))
}

fn rgba_bytes(frame: &Frame) -> Vec<u8> {
    frame
        .data()
        .chunks_exact(frame.channels().max(1) as usize)
        .flat_map(|px| match *px {
            [r, g, b, ..] => [r, g, b, 255],
            [v] => [v, v, v, 255],
            _ => [0, 0, 0, 255],
        })
        .collect()
}

fn describe(detection: &PathDetection) -> Option<String> {
    let estimate = detection.estimate.as_ref()?;
    Some(format!(
        "centroid ({:.0}, {:.0})  heading {:+.1}\u{b0}  area {:.0} px",
        estimate.centroid.0,
        estimate.centroid.1,
        estimate.heading_degrees(),
        estimate.area
    ))
}
