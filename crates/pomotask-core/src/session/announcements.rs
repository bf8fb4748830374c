use crate::timer::IntervalKind;

pub const NO_TASKS_ANNOUNCEMENT: &str = "No tasks left to work on. Add a task to start a session.";
pub const SESSION_ENDED_ANNOUNCEMENT: &str = "Session ended.";
pub const TASK_DONE_ANNOUNCEMENT: &str = "Nice work! The next task starts after the break.";
pub const TASK_NOT_DONE_ANNOUNCEMENT: &str = "No problem, the same task continues after the break.";

pub fn focus_announcement(task: &str) -> String {
    format!("Focus: {task}")
}

pub fn break_prompt(kind: IntervalKind, task: &str) -> String {
    format!("{kind}! Did you finish \"{task}\"?")
}
