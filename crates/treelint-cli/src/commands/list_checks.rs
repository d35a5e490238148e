//! List-checks command implementation.

use treelint_checks::{all_checks, Check};

/// Runs the list-checks command.
pub fn run() {
    println!("Available checks:\n");
    println!("{:<22} {:<16} Description", "Name", "State");
    println!("{}", "-".repeat(80));

    for check in all_checks() {
        println!(
            "{:<22} {:<16} {}",
            check.name(),
            check.statefulness().to_string(),
            check.description()
        );
    }

    println!("\nDeclare checks in treelint.toml, in the order they should run:");
    println!("  [[checks]]");
    println!("  name = \"nested-if-depth\"");
    println!("  max = 2");
}
