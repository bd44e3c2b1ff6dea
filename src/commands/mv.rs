use std::path::Path;

use crate::error::Result;
use crate::output::{self, Format};
use crate::store::tasks::TaskStore;

pub fn run(
    store_path: &Path,
    id: String,
    parent: Option<String>,
    position: Option<usize>,
    format: Format,
) -> Result<()> {
    let store = TaskStore::open(store_path)?;
    let id = store.resolve_id(&id)?;
    let parent = parent.map(|p| store.resolve_id(&p)).transpose()?;
    // An omitted position means the tail; usize::MAX clamps there.
    let forest = store.move_task(&id, parent.as_deref(), position.unwrap_or(usize::MAX))?;
    output::print_forest(&forest, format)
}
