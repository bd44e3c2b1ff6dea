use std::path::Path;

use chrono::Local;

use crate::error::Result;
use crate::output::{self, Format};
use crate::store::tasks::TaskStore;

pub fn run(store_path: &Path, id: String, format: Format) -> Result<()> {
    let store = TaskStore::open(store_path)?;
    let id = store.resolve_id(&id)?;
    let completion = store.complete(&id, Local::now().date_naive())?;
    output::print_completion(&completion, format)
}
