//! Dep Provisioner - packaging host driver for the dependency provisioner.
//!
//! This binary runs the provisioner's installer lifecycle hooks (check,
//! acquire, place, ensure) against a declarative install manifest, with
//! proper error reporting and cancellation handling.

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match dep_provisioner::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
