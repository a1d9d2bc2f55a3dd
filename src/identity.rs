//! Process identity
//!
//! Resolves the subsystem identifier that scopes transcripts to this
//! application's own entries.

use crate::constants::{DEFAULT_SUBSYSTEM, SUBSYSTEM_ENV_VAR};

/// Subsystem of the running application
///
/// In order: `configured`, the `OSLOGS_SUBSYSTEM` environment variable, the
/// executable's file stem, then `"OSLogger"`.
pub fn subsystem(configured: Option<&str>) -> String {
    resolve(
        configured,
        std::env::var(SUBSYSTEM_ENV_VAR).ok().as_deref(),
        executable_stem().as_deref(),
    )
}

fn executable_stem() -> Option<String> {
    let exe = std::env::current_exe().ok()?;
    exe.file_stem()?.to_str().map(String::from)
}

fn resolve(configured: Option<&str>, env: Option<&str>, exe: Option<&str>) -> String {
    [configured, env, exe]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SUBSYSTEM)
        .to_string()
}
