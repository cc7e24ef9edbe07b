use clap::Args;
use std::path::PathBuf;

use crate::commands::run_cli;
use crate::common::{load_merged, write_output};

#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    #[arg(value_name = "BASE", help = "Base document; its metadata is kept")]
    pub base: PathBuf,
    #[arg(value_name = "FILES", help = "Documents merged into the base, in order")]
    pub files: Vec<PathBuf>,
    #[arg(short = 'o', long = "output", help = "Write to a file instead of stdout")]
    pub output: Option<PathBuf>,
}

pub fn run(args: MergeArgs) -> i32 {
    run_cli(|| run_inner(args))
}

fn run_inner(args: MergeArgs) -> Result<(), String> {
    let mut paths = vec![args.base];
    paths.extend(args.files);

    let merged = load_merged(&paths)?;
    let yaml = serde_yaml::to_string(&merged)
        .map_err(|err| format!("Failed to serialize merged document: {err}"))?;
    write_output(args.output.as_deref(), &yaml)
}
