use chrono::{Local, NaiveDate};
use clap::ValueEnum;
use colored::Colorize;

use crate::error::Result;
use crate::model::{Completion, Task, TaskNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Pretty,
}

pub fn print_task(task: &Task, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(task)?),
        Format::Pretty => println!("{}", task_line(task)),
    }
    Ok(())
}

pub fn print_tasks(tasks: &[Task], format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(tasks)?),
        Format::Pretty => {
            if tasks.is_empty() {
                println!("(no tasks)");
            }
            for task in tasks {
                println!("{}", task_line(task));
            }
        }
    }
    Ok(())
}

pub fn print_forest(forest: &[TaskNode], format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(forest)?),
        Format::Pretty => {
            if forest.is_empty() {
                println!("(no tasks)");
            }
            for node in forest {
                print_node(node, "", true, true);
            }
        }
    }
    Ok(())
}

pub fn print_completion(completion: &Completion, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(completion)?),
        Format::Pretty => match completion {
            Completion::Rescheduled(task) => {
                let due = task
                    .due
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("rescheduled: [{}] {} -> due {}", short_id(&task.id), task.title, due);
            }
            Completion::Done(task) => {
                println!("done: [{}] {}", short_id(&task.id), task.title);
            }
        },
    }
    Ok(())
}

/// First eight hex characters, enough to address a task from the shell.
pub fn short_id(id: &str) -> &str {
    if id.len() > 8 { &id[..8] } else { id }
}

fn task_line(task: &Task) -> String {
    let mut line = format!("[{}] {}", short_id(&task.id), task.title);
    if let Some(suffix) = schedule_suffix(task.due, task.recurrence) {
        line.push(' ');
        line.push_str(&suffix);
    }
    line
}

fn node_line(node: &TaskNode) -> String {
    let mut line = format!("[{}] {}", short_id(&node.id), node.title);
    if let Some(suffix) = schedule_suffix(node.due, node.recurrence) {
        line.push(' ');
        line.push_str(&suffix);
    }
    line
}

/// "(due 2025-04-21, every 7d)" with the date colored red when overdue and
/// yellow when due today.
fn schedule_suffix(due: Option<NaiveDate>, recurrence: Option<u32>) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    if let Some(date) = due {
        let today = Local::now().date_naive();
        let text = format!("due {date}");
        let text = if date < today {
            text.red().to_string()
        } else if date == today {
            text.yellow().to_string()
        } else {
            text
        };
        parts.push(text);
    }
    if let Some(every) = recurrence {
        parts.push(format!("every {every}d"));
    }
    if parts.is_empty() {
        None
    } else {
        Some(format!("({})", parts.join(", ")))
    }
}

fn print_node(node: &TaskNode, prefix: &str, is_last: bool, is_root: bool) {
    let connector = if is_root {
        ""
    } else if is_last {
        "\u{2514}\u{2500}\u{2500} "
    } else {
        "\u{251c}\u{2500}\u{2500} "
    };
    println!("{}{}{}", prefix, connector, node_line(node));

    let child_prefix = if is_root {
        prefix.to_string()
    } else if is_last {
        format!("{}    ", prefix)
    } else {
        format!("{}\u{2502}   ", prefix)
    };

    for (i, child) in node.children.iter().enumerate() {
        let last = i == node.children.len() - 1;
        print_node(child, &child_prefix, last, false);
    }
}
