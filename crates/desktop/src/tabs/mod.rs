pub mod monitor_tab;
pub mod settings_tab;
