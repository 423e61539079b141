use anyhow::{Context, Result};
use clap::Parser;

use assay_charts::cli::Args;
use assay_charts::config::ChartOptions;
use assay_charts::data::loader::load_sheet;
use assay_charts::session::ChartSession;
use assay_charts::style::init_style;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let file_options = match &args.config {
        Some(path) => ChartOptions::from_json_file(path)?,
        None => ChartOptions::default(),
    };
    let options = args.apply_to(file_options);

    let style = init_style(args.font.as_deref());
    let session = ChartSession::new(style, options).context("invalid chart options")?;

    let sheet = load_sheet(&args.input, args.sheet.as_deref())
        .with_context(|| format!("loading {}", args.input.display()))?;

    let written = session
        .export(args.chart, &sheet.table, &sheet.name, &args.out_dir)
        .with_context(|| format!("drawing {} for sheet '{}'", args.chart, sheet.name))?;
    for path in &written {
        println!("{}", path.display());
    }
    Ok(())
}
