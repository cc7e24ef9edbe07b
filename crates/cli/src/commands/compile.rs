use clap::Args;
use std::path::PathBuf;

use crate::commands::run_cli;
use crate::common::{CompileFlags, load_merged, write_output};

#[derive(Args, Debug, Clone)]
pub struct CompileArgs {
    #[arg(
        value_name = "FILES",
        required = true,
        help = "Documents to compile; the first is the base"
    )]
    pub files: Vec<PathBuf>,
    #[command(flatten)]
    pub flags: CompileFlags,
    #[arg(short = 'o', long = "output", help = "Write to a file instead of stdout")]
    pub output: Option<PathBuf>,
}

pub fn run(args: CompileArgs) -> i32 {
    run_cli(|| run_inner(args))
}

fn run_inner(args: CompileArgs) -> Result<(), String> {
    let options = args.flags.options()?;
    let doc = load_merged(&args.files)?;
    let ir = specgen_core::compile(&doc, &options)
        .map_err(|err| format!("Failed to compile documents: {err}"))?;

    let mut json = serde_json::to_string_pretty(&ir)
        .map_err(|err| format!("Failed to serialize IR: {err}"))?;
    json.push('\n');
    write_output(args.output.as_deref(), &json)
}
