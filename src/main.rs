//! rngrig CLI binary.
//!
//! Minimal entrypoint: all logic is in the library; main only invokes
//! `cli::run()` and maps the result to a process exit code.

fn main() {
    match rngrig::cli::run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}
