//! `specgen` command-line entry point.

fn main() {
    specgen_cli::init_tracing();
    std::process::exit(specgen_cli::run(std::env::args().collect()));
}
