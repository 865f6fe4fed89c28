//! Crosswire binary entry point.

use crosswire::cli;
use crosswire::ui::output;

fn main() {
    if let Err(err) = cli::run() {
        output::error(format!("{:#}", err));
        std::process::exit(1);
    }
}
