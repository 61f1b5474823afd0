//! Entry point for the sanprobe diagnostic.
//!
//! Usage: `sanprobe [VALUE [...]]`. Arguments are taken verbatim from the OS;
//! there is no flag parsing, so `-1` or `--help` reach the integer conversion
//! and stay addressable by index. Behavior is selected with `SANPROBE_MODE`
//! (`raw`, `trap`, `recover`) and `SANPROBE_LOG`.

use std::os::unix::ffi::OsStringExt;

use sanprobe_core::{LogEmitter, Probe, ProbeConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ProbeConfig::from_env();
    let argv: Vec<Vec<u8>> = std::env::args_os().map(OsStringExt::into_vec).collect();

    let probe = Probe::new(config);
    let mut log = LogEmitter::to_stderr(probe.config().log_level);
    let mut stdout = std::io::stdout().lock();

    probe.run(&argv, &mut stdout, &mut log)?;
    Ok(())
}
