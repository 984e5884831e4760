//! sqltable CLI binary entry point
//!
//! A thin wrapper around the library's `run_cli()`.

use anyhow::Result;
use sqltable_cli::run_cli;

fn main() -> Result<()> {
    run_cli()
}
