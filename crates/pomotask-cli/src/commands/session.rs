//! Foreground session runner.
//!
//! Reads one command per stdin line while the session loop runs:
//! `y`/`n` answer the break prompt, `q` asks to end the session and a
//! following `y` confirms. Ctrl-C ends the session without asking.

use clap::Subcommand;
use pomotask_core::{
    Config, Field, Handler, Notifier, SessionController, SessionState, SessionSummary, Visibility,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{open_controller, CliResult};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run pomodoros until the session is ended or no task is left
    Start,
}

/// Prints to the terminal. Announcements are skipped when notifications are
/// disabled; the summary and confirmation prompt always print.
struct ConsoleNotifier {
    announce: bool,
}

impl Notifier for ConsoleNotifier {
    fn set_announcement(&self, text: &str) {
        if self.announce {
            println!("{text}");
        }
    }

    fn set_button_visibility(&self, visibility: Visibility) {
        if self.announce && visibility == Visibility::Visible {
            println!("Answer with y or n.");
        }
    }

    fn open_summary(&self, summary: &SessionSummary) {
        match serde_json::to_string_pretty(summary) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!(error = %e, "could not render session summary"),
        }
    }

    fn open_confirmation(&self) {
        println!("End the session? [y/n]");
    }
}

/// Whole minutes left, printed as the countdown crosses each minute.
fn minute_marks() -> Handler {
    Box::new(|state: &SessionState| {
        let secs = state.current_time;
        if state.is_active() && secs > 0 && secs % 60 == 0 {
            println!("{}: {} min left", state.current_interval, secs / 60);
        }
    })
}

/// What a line of input asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Yes,
    No,
    Quit,
    Empty,
    Unknown,
}

impl Input {
    fn parse(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Input::Yes,
            "n" | "no" => Input::No,
            "q" | "quit" => Input::Quit,
            "" => Input::Empty,
            _ => Input::Unknown,
        }
    }
}

fn handle_input(controller: &SessionController, input: Input, confirming: &mut bool) -> CliResult {
    match (input, *confirming) {
        (Input::Yes, true) => {
            *confirming = false;
            controller.confirm_end_session();
        }
        (Input::No, true) => {
            *confirming = false;
            println!("Continuing.");
        }
        (Input::Yes | Input::No, false) => {
            if !controller.answer_task_completed(input == Input::Yes)? {
                println!("Nothing to answer right now.");
            }
        }
        (Input::Quit, _) => *confirming = controller.request_end_session(),
        (Input::Empty, _) => {}
        (Input::Unknown, _) => println!("Use y, n or q."),
    }
    Ok(())
}

async fn start() -> CliResult {
    let config = Config::load()?;
    let notifier = Arc::new(ConsoleNotifier {
        announce: config.notifications.enabled,
    });
    let controller = Arc::new(open_controller(&config, notifier)?);
    controller.subscribe([(Field::CurrentTime, minute_marks())]);

    let mut session = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.start_session().await }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut confirming = false;
    let mut signals = true;
    loop {
        tokio::select! {
            joined = &mut session => {
                joined??;
                break;
            }
            signal = tokio::signal::ctrl_c(), if signals => match signal {
                Ok(()) => {
                    controller.end_session();
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Ctrl-C handler unavailable");
                    signals = false;
                }
            },
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => handle_input(&controller, Input::parse(&line), &mut confirming)?,
                None => stdin_open = false,
            },
        }
    }
    Ok(())
}

pub fn run(action: SessionAction) -> CliResult {
    match action {
        SessionAction::Start => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            let result = runtime.block_on(start());
            // a pending stdin read would otherwise hold the runtime open
            runtime.shutdown_background();
            result
        }
    }
}
