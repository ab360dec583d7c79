use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::{BindArgs, Cli};
use crate::io::write_atomic;
use crate::map::Bindings;
use crate::sync::{DocumentLoader, MapSource};
use crate::types::{Generation, SeatId};

#[derive(Serialize)]
struct BindingRow {
    shape: String,
    kind: &'static str,
    seat: Option<SeatId>,
    center: Option<[f64; 2]>,
}

pub async fn run(cli: &Cli, args: &BindArgs) -> Result<()> {
    let mut config = super::load_config(cli)?;
    if let Some(threshold) = args.threshold { config.threshold = threshold }
    let config = config.sanitized();

    let source = MapSource::parse(&args.map);
    let (loader, _) = DocumentLoader::new(&config)?;
    let document = loader.load(Generation(1), &source).await
        .with_context(|| format!("[bind] Failed to load {source}"))?;
    let bindings = Bindings::build(&document, config.threshold);
    info!("[bind] {source}: {}/{} shapes bound", bindings.bound_count(), bindings.len());

    let rows: Vec<BindingRow> = document.shapes().iter()
        .map(|shape| BindingRow {
            shape: shape.id.to_string(),
            kind: shape.kind.tag(),
            seat: bindings.seat_of(shape.id),
            center: shape.center().map(|c| [c.x, c.y]),
        })
        .collect();
    let json = serde_json::to_string_pretty(&rows)?;

    match &args.output {
        Some(path) => {
            write_atomic(path, json.as_bytes(), args.force)?;
            println!("Wrote bindings -> {}", path.display());
        }
        None => writeln!(std::io::stdout().lock(), "{json}")?,
    }
    Ok(())
}
