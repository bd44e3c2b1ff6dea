use std::path::Path;

use crate::error::Result;
use crate::output::{self, Format};
use crate::store::tasks::TaskStore;

pub fn run(store_path: &Path, id: String, format: Format) -> Result<()> {
    let store = TaskStore::open(store_path)?;
    let id = store.resolve_id(&id)?;
    store.delete(&id)?;
    match format {
        Format::Json => println!("{}", serde_json::json!({ "deleted": id })),
        Format::Pretty => println!("deleted [{}]", output::short_id(&id)),
    }
    Ok(())
}
