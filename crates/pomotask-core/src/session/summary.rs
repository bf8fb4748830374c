//! End-of-session summary: actual vs. estimated pomodoros per task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::Task;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub name: String,
    pub used_pomodoros: u32,
    pub estimated_pomodoros: u32,
    pub completed: bool,
}

impl SummaryRow {
    /// Pomodoros spent beyond (positive) or under (negative) the estimate.
    pub fn delta(&self) -> i64 {
        i64::from(self.used_pomodoros) - i64::from(self.estimated_pomodoros)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Pomodoros completed during the session being summarized.
    pub pomodoros_completed: u32,
    /// Completed tasks first, then the rest, each group in list order.
    pub rows: Vec<SummaryRow>,
    pub total_used: u32,
    pub total_estimated: u32,
    pub generated_at: DateTime<Utc>,
}

impl SessionSummary {
    pub fn from_tasks(tasks: &[Task], pomodoros_completed: u32) -> Self {
        let (done, open): (Vec<&Task>, Vec<&Task>) = tasks.iter().partition(|t| t.completed);
        let rows: Vec<SummaryRow> = done
            .into_iter()
            .chain(open)
            .map(|t| SummaryRow {
                name: t.name.clone(),
                used_pomodoros: t.used_pomodoros,
                estimated_pomodoros: t.estimated_pomodoros,
                completed: t.completed,
            })
            .collect();

        Self {
            pomodoros_completed,
            total_used: rows.iter().map(|r| r.used_pomodoros).sum(),
            total_estimated: rows.iter().map(|r| r.estimated_pomodoros).sum(),
            rows,
            generated_at: Utc::now(),
        }
    }

    pub fn completed_rows(&self) -> impl Iterator<Item = &SummaryRow> {
        self.rows.iter().filter(|r| r.completed)
    }
}
