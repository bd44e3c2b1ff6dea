use std::net::SocketAddr;
use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::error::Result;
use crate::server;
use crate::store::tasks::TaskStore;

pub fn run(store_path: &Path, addr: SocketAddr) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = TaskStore::open(store_path)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server::serve(store, addr))
}
