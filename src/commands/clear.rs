use std::path::Path;

use crate::error::Result;
use crate::output::Format;
use crate::store::tasks::TaskStore;

pub fn run(store_path: &Path, format: Format) -> Result<()> {
    let store = TaskStore::open(store_path)?;
    store.clear()?;
    match format {
        Format::Json => println!("{}", serde_json::json!({ "cleared": true })),
        Format::Pretty => println!("cleared all tasks"),
    }
    Ok(())
}
