use std::process;

use anyhow::Result;
use log::{debug, error};

use knot::cli::{get_actions, get_log_file, get_matches, get_verbosity};
use knot::config::SystemInfo;
use knot::logging::init_logger;
use knot::workflow::{run, Actions};

fn main() {
    human_panic::setup_panic!();

    let matches = get_matches();
    let system = SystemInfo::load();

    // The log file given on the command line wins over the configured one
    let log_file = get_log_file(&matches).or_else(|| {
        system
            .as_ref()
            .ok()
            .and_then(|system| system.config.log_file.clone())
    });
    if let Err(e) = init_logger(get_verbosity(&matches), log_file.as_deref()) {
        eprintln!("Failed to initialise logging: {e:#}");
        process::exit(1);
    }

    let result = system
        .map_err(anyhow::Error::from)
        .and_then(|mut system| execute(&get_actions(&matches), &mut system));
    if let Err(e) = result {
        error!("{e:#}");
        process::exit(1);
    }
}

fn execute(actions: &Actions, system: &mut SystemInfo) -> Result<()> {
    debug!("Running {actions:?}");
    let stats = run(actions, system)?;
    debug!("{stats:?}");
    Ok(())
}
