use clap::{ArgAction, Args};
use std::fs;
use std::path::PathBuf;
use tera::Context;
use tracing::warn;

use crate::commands::run_cli;
use crate::common::{CompileFlags, load_merged, new_file_path, write_output};

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[arg(value_name = "TEMPLATE", help = "Tera template rendered with the IR as context")]
    pub template: PathBuf,
    #[arg(value_name = "OUTFILE", help = "File the rendered output is written to")]
    pub outfile: PathBuf,
    #[arg(
        value_name = "FILES",
        required = true,
        help = "Documents to compile; the first is the base"
    )]
    pub files: Vec<PathBuf>,
    #[command(flatten)]
    pub flags: CompileFlags,
    #[arg(
        long = "overwrite",
        default_value_t = true,
        action = ArgAction::Set,
        help = "Replace OUTFILE if it exists; otherwise write OUTFILE.new"
    )]
    pub overwrite: bool,
}

pub fn run(args: RenderArgs) -> i32 {
    run_cli(|| run_inner(args))
}

fn run_inner(args: RenderArgs) -> Result<(), String> {
    let options = args.flags.options()?;
    let template = fs::read_to_string(&args.template).map_err(|err| {
        format!("Failed to read template {}: {err}", args.template.display())
    })?;

    let doc = load_merged(&args.files)?;
    let ir = specgen_core::compile(&doc, &options)
        .map_err(|err| format!("Failed to compile documents: {err}"))?;

    let context =
        Context::from_serialize(&ir).map_err(|err| format!("Failed to build context: {err}"))?;
    let rendered = tera::Tera::one_off(&template, &context, false).map_err(|err| {
        format!(
            "Template {} is not tera compatible: {err}",
            args.template.display()
        )
    })?;

    let target = if !args.overwrite && args.outfile.exists() {
        let target = new_file_path(&args.outfile);
        warn!(
            "{} exists, writing {} instead",
            args.outfile.display(),
            target.display()
        );
        target
    } else {
        args.outfile
    };

    write_output(Some(&target), &rendered)
}
