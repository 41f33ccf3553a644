use anyhow::Result;
use serde::Serialize;
use swbase::catalog::ModelCatalog;
use swbase::report::render_models;
use swbase_core::SwitchModel;

use crate::cli::{ModelsArgs, OutputFormat};

#[derive(Debug, Serialize)]
struct ModelRow {
    model: SwitchModel,
    base_ports: u32,
    base_prefix: String,
    extra_prefix: String,
    extra_slots: u32,
    from_catalog: bool,
}

pub fn run_models(args: ModelsArgs, verbose: bool) -> Result<()> {
    let catalog = ModelCatalog::resolve(args.models_file.as_deref());

    match args.format {
        OutputFormat::Text => println!("{}", render_models(&catalog, verbose)),
        OutputFormat::Json => {
            let rows: Vec<ModelRow> = SwitchModel::ALL
                .iter()
                .map(|&model| {
                    let layout = catalog.defaults_for(model);
                    ModelRow {
                        model,
                        base_ports: model.base_ports(),
                        base_prefix: layout.base_prefix,
                        extra_prefix: layout.extra_prefix,
                        extra_slots: layout.extra_slots,
                        from_catalog: catalog.entry(model).is_some(),
                    }
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }
    Ok(())
}
