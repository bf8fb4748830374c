mod engine;
mod interval;
mod ticker;

pub use engine::{count_down, CountdownHost, IntervalOutcome};
pub use interval::{IntervalKind, LONG_BREAK_EVERY};
pub use ticker::{Ticker, TokioTicker};
