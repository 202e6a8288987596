use std::process::ExitCode;

fn main() -> ExitCode {
    lilo_cli::run()
}
