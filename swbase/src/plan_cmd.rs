use anyhow::{Context, Result};
use log::info;
use swbase::catalog::ModelCatalog;
use swbase::params::{resolve, ParamsFile, SynthesisInput};
use swbase::report::{render_plan, PlanReport};
use swbase::store::{JsonProfileStore, ProfileRepository};

use crate::cli::{OutputFormat, PlanArgs, SwitchArgs};

pub fn run_plan(args: PlanArgs) -> Result<()> {
    let input = load_switch_input(&args.switch)?;
    let plan = input.plan();

    match args.format {
        OutputFormat::Text => println!("{}", render_plan(&input, &plan)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&PlanReport::new(&input, &plan))?
        ),
    }
    Ok(())
}

/// Load the profile and parameter layers named by `args` and resolve them.
pub fn load_switch_input(args: &SwitchArgs) -> Result<SynthesisInput> {
    let file = match &args.params {
        Some(path) => ParamsFile::load(path)?,
        None => ParamsFile::default(),
    };
    let layer = args.layer().layered_over(file);

    let store = JsonProfileStore::open(&args.store);
    let profile = match layer.profile.as_deref() {
        Some(name) => store
            .get(name)
            .with_context(|| format!("profile store {}", args.store.display()))?,
        None => store
            .list()
            .into_iter()
            .next()
            .with_context(|| format!("profile store {} holds no profiles", args.store.display()))?,
    };

    let catalog = ModelCatalog::resolve(args.models_file.as_deref());
    info!(
        "profile {} from {}, models from {}",
        profile.name,
        args.store.display(),
        catalog.source
    );

    let input = resolve(profile, &layer, &args.toggles(), &catalog)?;
    Ok(input)
}
