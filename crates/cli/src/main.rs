use std::process::ExitCode;

fn main() -> ExitCode {
    bayline_cli::run()
}
