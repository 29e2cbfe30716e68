//! Build environment setup script

use apkforge_config::fixed_paths;
use apkforge_types::Spec;
use std::fmt::Write as _;

/// Shell script that enables the spec's repositories and installs packages
///
/// `extra_packages` (pipeline needs) are installed after the spec's own
/// packages; a name listed twice is installed once.
#[must_use]
pub fn install_script(spec: &Spec, extra_packages: &[String]) -> String {
    let contents = &spec.environment.contents;
    let mut script = String::from("set -e\n");

    for repo in &contents.repositories {
        let _ = writeln!(
            script,
            "echo {} >> {}",
            quote(repo),
            fixed_paths::APK_REPOSITORIES
        );
    }

    let mut packages: Vec<&str> = Vec::new();
    for package in contents.packages.iter().chain(extra_packages) {
        if !packages.contains(&package.as_str()) {
            packages.push(package);
        }
    }
    if !packages.is_empty() {
        let _ = writeln!(script, "apk add --no-cache {}", packages.join(" "));
    }

    script
}

/// Double-quote `s` for the shell, escaping quotes, backslashes and control
/// characters
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
