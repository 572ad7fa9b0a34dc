use anyhow::Result;

use ytmusic_dl::log_success;

use super::App;
use crate::cli::PrefsCommand;

pub fn run_prefs(app: &App, command: Option<PrefsCommand>) -> Result<()> {
    match command.unwrap_or(PrefsCommand::Show) {
        PrefsCommand::Show => {
            println!("偏好文件: {}", app.prefs.path().display());
            println!("  theme: {:?}", app.prefs.theme());
            println!("  console-expanded: {}", app.prefs.console_expanded());
        }
        PrefsCommand::Theme { theme } => {
            app.prefs.set_theme(theme)?;
            log_success!("主题已设置为 {:?}", theme);
        }
        PrefsCommand::ConsoleExpanded { expanded } => {
            app.prefs.set_console_expanded(expanded)?;
            log_success!("日志面板默认{}", if expanded { "展开" } else { "收起" });
        }
    }
    Ok(())
}
