pub mod app;
pub mod logging;

use iced::Application;

pub use app::{DspiApp, Flags};
pub use logging::{
    apply_log_level, init_logging, LogEntry, LogLevel, LogStore, ReloadHandle,
};

pub type UiResult = iced::Result;

pub fn run(flags: Flags) -> UiResult {
    DspiApp::run(iced::Settings::with_flags(flags))
}
