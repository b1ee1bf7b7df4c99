use std::process::ExitCode;

fn main() -> ExitCode {
    match infical_core::run(std::env::args_os().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("infical: {err:#}");
            ExitCode::FAILURE
        }
    }
}
