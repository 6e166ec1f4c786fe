pub mod audience;
pub mod completion;
pub mod config;
pub mod live;
pub mod outline;

use colored::Colorize;

pub fn print_version() {
    println!(
        "{} {}",
        "diashow".bold(),
        env!("CARGO_PKG_VERSION").green()
    );
}
