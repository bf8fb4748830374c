use clap::Subcommand;
use pomotask_core::validation::{LONG_BREAK_RANGE, SHORT_BREAK_RANGE, TIMER_AUDIO_OPTIONS};

use super::{quiet_controller, CliResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show the current settings
    Show,
    /// Change break lengths or the notification sound
    Set {
        /// Short break in minutes (3-5)
        #[arg(long)]
        short_break: Option<String>,
        /// Long break in minutes (15-30)
        #[arg(long)]
        long_break: Option<String>,
        /// Notification sound
        #[arg(long)]
        audio: Option<String>,
    },
}

pub fn run(action: SettingsAction) -> CliResult {
    let controller = quiet_controller()?;

    match action {
        SettingsAction::Show => {
            println!("{}", serde_json::to_string_pretty(&controller.settings())?);
        }
        SettingsAction::Set {
            short_break,
            long_break,
            audio,
        } => {
            let current = controller.settings();
            let short_break =
                short_break.unwrap_or_else(|| current.short_break_length.to_string());
            let long_break = long_break.unwrap_or_else(|| current.long_break_length.to_string());
            let audio = audio.unwrap_or(current.timer_audio);

            let report = controller.save_settings(&short_break, &long_break, &audio)?;
            if report.ignored_while_active {
                return Err("settings cannot change while a session is running".into());
            }

            let mut problems = Vec::new();
            if report.short_break_rejected {
                let (lo, hi) = SHORT_BREAK_RANGE;
                problems.push(format!("short break must be between {lo} and {hi} minutes"));
            }
            if report.long_break_rejected {
                let (lo, hi) = LONG_BREAK_RANGE;
                problems.push(format!("long break must be between {lo} and {hi} minutes"));
            }
            if report.timer_audio_rejected {
                problems.push(format!("audio must be one of: {}", TIMER_AUDIO_OPTIONS.join(", ")));
            }

            println!("{}", serde_json::to_string_pretty(&controller.settings())?);
            if !problems.is_empty() {
                return Err(problems.join("; ").into());
            }
        }
    }
    Ok(())
}
