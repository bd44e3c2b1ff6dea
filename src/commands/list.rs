use std::path::Path;

use crate::error::Result;
use crate::output::{self, Format};
use crate::store::tasks::TaskStore;

pub fn run(store_path: &Path, id: Option<String>, format: Format) -> Result<()> {
    let store = TaskStore::open(store_path)?;
    let id = id.map(|i| store.resolve_id(&i)).transpose()?;
    let forest = store.list(id.as_deref())?;
    output::print_forest(&forest, format)
}
