#![forbid(unsafe_code)]

// Build information reported by the /version endpoint and at startup.
// Values fall back to "unknown" when the source tree is not a git checkout.
const UNKNOWN: &str = "unknown";

fn main() {
    let branch = build_data::get_git_branch().unwrap_or_else(|_| UNKNOWN.to_string());
    let commit = build_data::get_git_commit_short().unwrap_or_else(|_| UNKNOWN.to_string());
    let dirty = match build_data::get_git_dirty() {
        Ok(d) => d.to_string(),
        Err(_) => UNKNOWN.to_string(),
    };
    // Using the build time instead of the source time makes builds unreproducible.
    let source_ts = match build_data::get_source_time() {
        Ok(t) => build_data::format_timestamp(t),
        Err(_) => UNKNOWN.to_string(),
    };
    let rustc = build_data::get_rustc_version().unwrap_or_else(|_| UNKNOWN.to_string());

    println!("cargo:rustc-env=GIT_BRANCH={}", branch);
    println!("cargo:rustc-env=GIT_COMMIT_SHORT={}", commit);
    println!("cargo:rustc-env=GIT_DIRTY={}", dirty);
    println!("cargo:rustc-env=SOURCE_TIMESTAMP={}", source_ts);
    println!("cargo:rustc-env=RUSTC_VERSION={}", rustc);
}
