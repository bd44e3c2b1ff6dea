use std::path::Path;

use chrono::{Local, NaiveDate};

use crate::error::Result;
use crate::output::{self, Format};
use crate::store::tasks::TaskStore;

pub fn run(store_path: &Path, on: Option<NaiveDate>, format: Format) -> Result<()> {
    let store = TaskStore::open(store_path)?;
    let date = on.unwrap_or_else(|| Local::now().date_naive());
    let due = store.due_on_or_before(date)?;
    output::print_tasks(&due, format)
}
