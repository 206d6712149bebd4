use clap::Parser as _;

use ocm_playground::cli::Cli;

/// Exit code reported when the run is interrupted.
const INTERRUPT_EXIT_CODE: i32 = 130;

fn main() {
    if let Err(e) = ctrlc::set_handler(|| {
        std::process::exit(INTERRUPT_EXIT_CODE);
    }) {
        eprintln!("warning: could not install interrupt handler: {e}");
    }

    let cli = Cli::parse();
    std::process::exit(cli.run());
}
