use std::process::{Command, Output};

/// Run `git` in the package root; `None` when git is missing or the command fails.
fn git(args: &[&str]) -> Option<Output> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|out| out.status.success())
}

fn main() {
    for path in [".git/HEAD", ".git/refs/", ".git/index"] {
        println!("cargo:rerun-if-changed={path}");
    }

    let mut hash = git(&["rev-parse", "--short=10", "HEAD"])
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_owned())
        .unwrap_or_default();
    let dirty = git(&["status", "--porcelain", "--untracked-files=no"])
        .is_some_and(|out| !out.stdout.is_empty());
    if dirty && !hash.is_empty() {
        hash.push_str("-dirty");
    }

    // Only a clean checkout sitting exactly on a tag reports the bare version
    let release = !dirty && git(&["describe", "--exact-match", "--tags", "HEAD"]).is_some();

    println!("cargo:rustc-env=IMGNORM_GIT_HASH={hash}");
    println!("cargo:rustc-env=IMGNORM_RELEASE_TAG={release}");
}
