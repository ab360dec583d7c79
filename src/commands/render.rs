use anyhow::{bail, Context, Result};
use tracing::info;

use crate::cli::{Cli, RenderArgs};
use crate::io::{render_svg, write_atomic};
use crate::map::MapDocument;
use crate::results::FeedUpdate;
use crate::sync::{DocumentLoader, MapSource, MapSync};
use crate::types::Generation;

use super::ResultInputs;

pub async fn run(cli: &Cli, args: &RenderArgs) -> Result<()> {
    let config = super::load_config(cli)?;
    let inputs = ResultInputs::load(&args.results, &config)?;
    let source = MapSource::parse(&args.map);
    let (loader, _) = DocumentLoader::new(&config)?;
    let text = loader.fetch(&source).await
        .with_context(|| format!("[render] Failed to fetch {source}"))?;

    let mut sync = MapSync::new(config.clone(), inputs.colors, ());
    let generation = sync.begin_load();
    let document = MapDocument::parse(&text, generation, config.shapes_root.as_deref())
        .with_context(|| format!("[render] Failed to parse {source}"))?;
    sync.finish_load(generation, Ok(document));
    sync.set_candidates(inputs.candidates);
    if !inputs.winners.is_empty() {
        sync.apply_feed(FeedUpdate { generation: Generation(1), outcome: Ok(inputs.winners) });
    }

    if let Some(name) = &args.select {
        let Some(shape) = sync.document().shape_by_name(name).map(|s| s.id) else {
            bail!("[render] No shape named {name} in {source}");
        };
        sync.select_shape(Some(shape));
    }

    let Some(fills) = sync.fills() else { bail!("[render] map has no fill state") };
    let svg = render_svg(&text, sync.document(), sync.bindings(), fills, config.shapes_root.as_deref())?;
    write_atomic(&args.output, svg.as_bytes(), args.force)?;
    info!("[render] {} shapes, {} bound", sync.bindings().len(), sync.bindings().bound_count());
    println!("Wrote map -> {}", args.output.display());
    Ok(())
}
