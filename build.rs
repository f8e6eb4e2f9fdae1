fn main() {
    // Emits built.rs with package metadata and the git commit hash, if any.
    if let Err(err) = built::write_built_file() {
        println!("cargo:warning=failed to acquire build-time information: {err}");
    }
}
