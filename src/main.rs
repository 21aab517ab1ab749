//! gdpipe - command-line asset pipeline utilities for Godot projects

use std::process::ExitCode;

use gdpipe::cli;

fn main() -> ExitCode {
    cli::run()
}
