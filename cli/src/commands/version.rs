//! Version command

use std::process::ExitCode;

use crate::app::AppContext;
use crate::domain::migration::CURRENT_SCHEMA_VERSION;

/// Run the version command.
pub fn run(app: &AppContext) -> ExitCode {
    let version = env!("CARGO_PKG_VERSION");

    if app.is_json() {
        println!(r#"{{"version":"{version}","schema_version":{CURRENT_SCHEMA_VERSION}}}"#);
    } else {
        println!("vmagent {version} (template schema v{CURRENT_SCHEMA_VERSION})");
    }
    ExitCode::SUCCESS
}
