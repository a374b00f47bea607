use std::io::{self, Write};

use readmark::bench::{MatrixDriver, WorkerPools};
use readmark::config::Settings;
use readmark::{Result, CONCURRENCY_LEVELS};

fn main() -> Result<()> {
    // A broken config file falls back to defaults rather than aborting
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Ignoring config file: {}", e);
            Settings::default()
        }
    };

    let pools = WorkerPools::new(&CONCURRENCY_LEVELS)?;
    let driver = MatrixDriver::new(settings, &pools)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    driver.run(&mut out)?;
    out.flush()?;

    Ok(())
}
