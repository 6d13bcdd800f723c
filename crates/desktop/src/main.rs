mod app;
mod settings;
mod tabs;
mod theme;

use app::App;

fn main() -> iced::Result {
    env_logger::init();

    iced::application(App::new, App::update, App::view)
        .title("pathcam")
        .theme(App::theme)
        .subscription(App::subscription)
        .window(iced::window::Settings {
            size: iced::Size::new(760.0, 640.0),
            min_size: Some(iced::Size::new(480.0, 420.0)),
            ..Default::default()
        })
        .run()
}
