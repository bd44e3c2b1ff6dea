use std::path::Path;

use crate::error::Result;
use crate::output::{self, Format};
use crate::store::tasks::TaskStore;

pub fn run(
    store_path: &Path,
    id: String,
    days: Option<u32>,
    clear: bool,
    format: Format,
) -> Result<()> {
    let store = TaskStore::open(store_path)?;
    let id = store.resolve_id(&id)?;
    let every = if clear { None } else { days };
    let task = store.set_recurrence(&id, every)?;
    output::print_task(&task, format)
}
