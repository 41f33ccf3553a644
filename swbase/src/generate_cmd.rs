use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use swbase::report::render_generate_summary;
use swbase_core::{render_text, synthesize, FsKeySource};

use crate::cli::GenerateArgs;
use crate::path_guard;
use crate::plan_cmd::load_switch_input;

pub fn run_generate(args: GenerateArgs) -> Result<()> {
    let input = load_switch_input(&args.switch)?;
    let generated_at = match &args.timestamp {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("invalid --timestamp '{raw}' (expected RFC 3339)"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let plan = input.plan();
    let lines = synthesize(&input.synthesis(&plan, generated_at), &FsKeySource)
        .context("failed to synthesize configuration")?;
    let mut text = render_text(&lines);
    text.push('\n');

    if args.stdout {
        print!("{text}");
        return Ok(());
    }

    let hostname = &input.params.hostname;
    let path = match &args.output {
        Some(path) => path.clone(),
        None => {
            if hostname.contains(['/', '\\']) {
                bail!("hostname '{hostname}' cannot be used as a file name; pass --output");
            }
            args.out_dir.join(format!("{hostname}-baseline.cfg"))
        }
    };

    let mut inputs: Vec<&Path> = vec![args.switch.store.as_path()];
    inputs.extend(args.switch.params.as_deref());
    inputs.extend(args.switch.models_file.as_deref());
    inputs.extend(input.params.ssh_pubkey_path.as_deref());
    path_guard::ensure_output_not_same(&path, &inputs)?;

    write_config(&path, &text)?;
    info!("wrote {} statements to {}", lines.len(), path.display());
    println!(
        "{}",
        render_generate_summary(Some(path.as_path()), &input, &plan, lines.len())
    );
    Ok(())
}

fn write_config(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            bail!("output directory {} does not exist", parent.display());
        }
    }
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}
