use std::io;
use clap::Parser;
use crate::config::Cli;
use crate::interactive::process_interactive_mode;
use crate::utils::setup_logging;

pub fn process_args() -> io::Result<String> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level)?;
    process_interactive_mode(&cli)
}
