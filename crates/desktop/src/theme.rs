use iced::color;
use iced::theme::Palette;
use iced::{Color, Theme};

use pathcam_core::pipeline::monitor_session::SessionStatus;

use crate::settings::Appearance;

/// Builds the window theme. Dark palettes are the default because the
/// video area reads better against a dark frame.
pub fn resolve_theme(appearance: Appearance, high_contrast: bool) -> Theme {
    let is_dark = match appearance {
        Appearance::Dark => true,
        Appearance::Light => false,
        Appearance::System => detect_system_dark_mode(),
    };

    let palette = match (is_dark, high_contrast) {
        (true, false) => Palette {
            background: color!(0x18, 0x1a, 0x1b),
            text: color!(0xd0, 0xd4, 0xd6),
            primary: color!(0x3d, 0xa5, 0x7a),
            success: color!(0x30, 0xd1, 0x58),
            warning: color!(0xff, 0xcc, 0x00),
            danger: color!(0xff, 0x45, 0x3a),
        },
        (false, false) => Palette {
            background: color!(0xf4, 0xf6, 0xf5),
            text: color!(0x1b, 0x1f, 0x1d),
            primary: color!(0x1f, 0x8a, 0x5e),
            success: color!(0x34, 0xc7, 0x59),
            warning: color!(0xff, 0x9f, 0x0a),
            danger: color!(0xff, 0x3b, 0x30),
        },
        (true, true) => Palette {
            background: color!(0x00, 0x00, 0x00),
            text: color!(0xff, 0xff, 0xff),
            primary: color!(0x4c, 0xe0, 0x9c),
            success: color!(0x30, 0xd1, 0x58),
            warning: color!(0xff, 0xd6, 0x0a),
            danger: color!(0xff, 0x45, 0x3a),
        },
        (false, true) => Palette {
            background: color!(0xff, 0xff, 0xff),
            text: color!(0x00, 0x00, 0x00),
            primary: color!(0x00, 0x6b, 0x3c),
            success: color!(0x24, 0x8a, 0x3d),
            warning: color!(0xb2, 0x5c, 0x00),
            danger: color!(0xd7, 0x00, 0x15),
        },
    };

    Theme::custom("pathcam", palette)
}

/// Color for the status label.
pub fn status_color(theme: &Theme, status: SessionStatus) -> Color {
    let palette = theme.palette();
    match status {
        SessionStatus::Connected | SessionStatus::Detection(_) => palette.success,
        SessionStatus::FrameReadFailed => palette.warning,
        SessionStatus::EmptyAddress | SessionStatus::ConnectFailed => palette.danger,
        SessionStatus::Idle | SessionStatus::Disconnected => palette.text,
    }
}

fn detect_system_dark_mode() -> bool {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
            .map(|o| {
                String::from_utf8_lossy(&o.stdout)
                    .trim()
                    .eq_ignore_ascii_case("dark")
            })
            .unwrap_or(true)
    }
    #[cfg(not(target_os = "macos"))]
    {
        true
    }
}
