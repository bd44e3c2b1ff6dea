use std::path::Path;

use chrono::Local;

use crate::error::Result;
use crate::output::{self, Format};
use crate::store::tasks::TaskStore;
use crate::timespec;

pub fn run(
    store_path: &Path,
    id: String,
    expr: Option<String>,
    clear: bool,
    format: Format,
) -> Result<()> {
    let store = TaskStore::open(store_path)?;
    let id = store.resolve_id(&id)?;

    let task = if clear {
        store.set_schedule(&id, None, None)?
    } else {
        let expr = expr.unwrap_or_default();
        let schedule = timespec::resolve(&expr, Local::now().date_naive())?;
        store.set_schedule(&id, Some(schedule.date), schedule.every)?
    };
    output::print_task(&task, format)
}
