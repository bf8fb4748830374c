pub mod config;
pub mod session;
pub mod settings;
pub mod task;

use std::error::Error;
use std::sync::Arc;

use pomotask_core::{
    Config, Notifier, NullNotifier, SessionContext, SessionController, SqliteStore, TokioTicker,
};

pub type CliResult = Result<(), Box<dyn Error>>;

/// Open the controller over the on-disk task list and settings.
pub fn open_controller(
    config: &Config,
    notifier: Arc<dyn Notifier>,
) -> Result<SessionController, Box<dyn Error>> {
    let storage = SqliteStore::open()?;
    let context = SessionContext::restore(Box::new(storage), &config.timer)?;
    let ticker = Arc::new(TokioTicker::from_millis(config.timer.tick_ms.max(1)));
    Ok(SessionController::new(context, ticker, notifier))
}

/// A controller for one-shot commands that never run the timer.
pub fn quiet_controller() -> Result<SessionController, Box<dyn Error>> {
    open_controller(&Config::load()?, Arc::new(NullNotifier))
}
