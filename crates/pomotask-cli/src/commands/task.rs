//! Task management commands for CLI.

use clap::Subcommand;
use pomotask_core::{FormOutcome, Task};

use super::{quiet_controller, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task
    Add {
        /// Task name
        name: String,
        /// Estimated pomodoros (default: 1)
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        estimate: String,
    },
    /// List tasks, selected first and completed last
    List {
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a task
    Delete {
        /// Task name
        name: String,
    },
    /// Select the task to work on next
    Select {
        /// Task name
        name: String,
    },
    /// Mark a task as completed
    Finish {
        /// Task name
        name: String,
    },
    /// Rename or re-estimate a task
    Edit {
        /// Current task name
        name: String,
        /// New name
        #[arg(long = "name")]
        new_name: Option<String>,
        /// New estimated pomodoros
        #[arg(long, allow_hyphen_values = true)]
        estimate: Option<String>,
    },
}

fn format_task(task: &Task) -> String {
    let marker = if task.completed {
        'x'
    } else if task.selected {
        '*'
    } else {
        ' '
    };
    format!(
        "[{marker}] {}  {}/{}",
        task.name, task.used_pomodoros, task.estimated_pomodoros
    )
}

fn accepted(outcome: FormOutcome) -> CliResult {
    match outcome {
        FormOutcome::Accepted => Ok(()),
        FormOutcome::Rejected(reason) => Err(reason.to_string().into()),
    }
}

pub fn run(action: TaskAction) -> CliResult {
    let controller = quiet_controller()?;

    match action {
        TaskAction::Add { name, estimate } => {
            accepted(controller.submit_task(&name, &estimate)?)?;
            println!("Task added: {}", name.trim());
        }
        TaskAction::List { json } => {
            let tasks = controller.tasks();
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("No tasks.");
            } else {
                for task in &tasks {
                    println!("{}", format_task(task));
                }
            }
        }
        TaskAction::Delete { name } => {
            if !controller.delete_task(&name)? {
                return Err(format!("no task named '{name}'").into());
            }
            println!("Task deleted: {name}");
        }
        TaskAction::Select { name } => {
            if !controller.select_task(&name)? {
                return Err(format!("task '{name}' cannot be selected").into());
            }
            println!("Task selected: {name}");
        }
        TaskAction::Finish { name } => {
            if !controller.finish_task(&name)? {
                return Err(format!("task '{name}' cannot be finished").into());
            }
            println!("Task finished: {name}");
        }
        TaskAction::Edit {
            name,
            new_name,
            estimate,
        } => {
            accepted(controller.edit_task(&name, new_name.as_deref(), estimate.as_deref())?)?;
            println!("Task updated: {}", new_name.as_deref().unwrap_or(&name).trim());
        }
    }
    Ok(())
}
