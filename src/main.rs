#![deny(warnings)]

extern crate splitter;
use splitter::app::Application;

use std::process::ExitCode;

fn main() -> ExitCode {
    let exit_code = Application::run();
    ExitCode::from(u8::try_from(exit_code).unwrap_or(u8::MAX))
}
