mod fit_bisbm;

use clap::Parser;
use fit_bisbm::*;

fn main() {
    let args = match FitArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            // --help and --version are not failures
            std::process::exit(if err.use_stderr() { 1 } else { 0 });
        }
    };

    if let Err(err) = fit_bisbm(&args) {
        eprintln!("Error: {:#}", err);
        std::process::exit(exit_code(&err));
    }
}
