#![forbid(unsafe_code)]

fn main() {
    if let Err(error) = zonage_cli::run_from_env() {
        eprintln!("zonage: {error}");
        std::process::exit(error.exit_code());
    }
}
