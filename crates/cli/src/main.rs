use std::io;

use stockroom_cli::{CliConfig, Session, open_inventory};

fn main() -> anyhow::Result<()> {
    stockroom_observability::init();

    let config = CliConfig::from_env();
    tracing::info!(file = %config.file.display(), "starting inventory session");

    let mut inventory = open_inventory(&config.file)?;

    let stdin = io::stdin();
    let mut session = Session::new(stdin.lock(), io::stdout());
    session.run(&mut inventory)
}
