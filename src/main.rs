use std::process::ExitCode;

fn main() -> ExitCode {
    authscan::app::startup::startup()
}
