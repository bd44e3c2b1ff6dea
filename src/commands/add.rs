use std::path::Path;

use chrono::Local;

use crate::error::Result;
use crate::output::{self, Format};
use crate::store::tasks::TaskStore;
use crate::timespec;

pub fn run(
    store_path: &Path,
    title: String,
    parent: Option<String>,
    position: Option<usize>,
    due: Option<String>,
    format: Format,
) -> Result<()> {
    let store = TaskStore::open(store_path)?;
    let parent = parent.map(|p| store.resolve_id(&p)).transpose()?;
    // Resolve the expression before creating anything, so a bad expression
    // leaves no stray task behind.
    let schedule = due
        .map(|expr| timespec::resolve(&expr, Local::now().date_naive()))
        .transpose()?;

    let mut task = store.create(&title, parent.as_deref(), position)?;
    if let Some(schedule) = schedule {
        task = store.set_schedule(&task.id, Some(schedule.date), schedule.every)?;
    }
    output::print_task(&task, format)
}
