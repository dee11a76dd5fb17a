use std::process::ExitCode;

use bugsmith::ui::output;

fn main() -> ExitCode {
    match bugsmith::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
