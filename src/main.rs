use std::process::ExitCode;

fn main() -> ExitCode {
    halo_mc::app::run()
}
