mod config;
mod error;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use karyo_core::{loader_for, Chromosome, ModelLoader, WidgetOptions, WidgetState};
use karyo_render::SvgRenderTarget;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{format_error_with_suggestions, parse_range, widget_error, CliError};

#[derive(Parser)]
#[command(name = "karyo")]
#[command(about = "karyo - chromosome karyotype rendering")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one chromosome to SVG
    Render {
        /// DAS server URL, DAS XML file (.xml/.xml.gz) or JSON band model
        #[arg(short, long)]
        input: Option<String>,

        /// Segment (chromosome) id, e.g. "1" or "X"
        #[arg(short, long)]
        segment: String,

        /// Output SVG file
        #[arg(short, long)]
        output: PathBuf,

        /// Render target selector
        #[arg(long, default_value = "#karyo")]
        target: String,

        /// Canvas width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Band height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Size relative to the reference chromosome length
        #[arg(long)]
        relative_size: bool,

        /// Draw the base-pair axis
        #[arg(long)]
        axis: bool,

        /// Disable the range selector
        #[arg(long)]
        no_selector: bool,

        /// Initial selection as START-END in base pairs
        #[arg(long)]
        select: Option<String>,

        /// Click a band by id (selects its extent)
        #[arg(long)]
        click: Option<String>,

        /// Hover a band by id (shows its label)
        #[arg(long)]
        hover: Option<String>,

        /// Configuration file (defaults to ./karyo.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print widget events to stdout as JSON lines
        #[arg(long)]
        events: bool,
    },

    /// List the bands of a segment
    Bands {
        /// DAS server URL, DAS XML file or JSON band model
        #[arg(short, long)]
        input: Option<String>,

        /// Segment (chromosome) id
        #[arg(short, long)]
        segment: String,

        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print or write an example configuration
    Config {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

struct RenderArgs {
    input: Option<String>,
    segment: String,
    output: PathBuf,
    target: String,
    width: Option<u32>,
    height: Option<u32>,
    relative_size: bool,
    axis: bool,
    no_selector: bool,
    select: Option<String>,
    click: Option<String>,
    hover: Option<String>,
    config: Option<PathBuf>,
    events: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(err) = run(cli.command) {
        match err.downcast_ref::<CliError>() {
            Some(cli_err) => eprintln!("Error: {}", format_error_with_suggestions(cli_err)),
            None => eprintln!("Error: {:#}", err),
        }
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Render {
            input,
            segment,
            output,
            target,
            width,
            height,
            relative_size,
            axis,
            no_selector,
            select,
            click,
            hover,
            config,
            events,
        } => cmd_render(RenderArgs {
            input,
            segment,
            output,
            target,
            width,
            height,
            relative_size,
            axis,
            no_selector,
            select,
            click,
            hover,
            config,
            events,
        }),
        Commands::Bands { input, segment, config } => cmd_bands(input, segment, config),
        Commands::Config { output } => cmd_config(output),
    }
}

/// File values first, then command line overrides.
fn resolve_options(args: &RenderArgs, config: &Config) -> WidgetOptions {
    let mut options = config.widget_options(&args.target, &args.segment);
    if let Some(input) = &args.input {
        options.das_source = input.clone();
    }
    if let Some(width) = args.width {
        options.width = width;
    }
    if let Some(height) = args.height {
        options.height = height;
    }
    options.relative_size |= args.relative_size;
    options.include_axis |= args.axis;
    if args.no_selector {
        options.include_selector = false;
    }
    options
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let options = resolve_options(&args, &config);
    options.validate().map_err(CliError::from)?;
    let selection = args.select.as_deref().map(parse_range).transpose()?;

    let target = SvgRenderTarget::new(config.export.clone()).with_targets([args.target.clone()]);
    let mut widget = Chromosome::from_options(options, target).map_err(|e| widget_error(&args.segment, e))?;
    let source = widget.source();
    log::info!("Rendering segment {} from {}", args.segment, source);

    let export = widget.target_mut().config_mut();
    if export.provenance_comment.is_none() {
        export.provenance_comment = Some(format!("source: {}\nsegment: {}", source, args.segment));
    }

    if args.events {
        widget.on_any(|event| match serde_json::to_string(event) {
            Ok(line) => println!("{}", line),
            Err(e) => log::warn!("Could not serialize event: {}", e),
        });
    }

    let state = widget.draw();
    if state != WidgetState::Rendered {
        return Err(CliError::load(args.segment.clone(), format!("widget ended in state {:?}", state)).into());
    }

    if let Some(band) = &args.hover {
        if !widget.hover_band(band) {
            return Err(CliError::unknown_band(args.segment.as_str(), band.as_str()).into());
        }
    }
    if let Some(band) = &args.click {
        if widget.click_band(band).is_none() {
            return Err(CliError::unknown_band(args.segment.as_str(), band.as_str()).into());
        }
    }
    if let Some((start, end)) = selection {
        widget
            .move_selector_to(start, end)
            .map_err(|e| CliError::selection(args.select.clone().unwrap_or_default(), e.to_string()))?;
    }
    if let Some(current) = widget.get_current_selection() {
        log::info!("Selection: {:.0}-{:.0}", current.start, current.end);
    }

    widget
        .target()
        .save(&args.target, &args.output)
        .map_err(|e| CliError::rendering(format!("{:#}", e)))?;
    log::info!("Wrote {}", args.output.display());
    Ok(())
}

fn cmd_bands(input: Option<String>, segment: String, config_path: Option<PathBuf>) -> Result<()> {
    let config = Config::load(config_path.as_deref())?;
    let mut options = config.widget_options("#karyo", &segment);
    if let Some(input) = input {
        options.das_source = input;
    }

    let loader = loader_for(&options).map_err(|e| CliError::load(segment.clone(), e.to_string()))?;
    let model = loader
        .load_model()
        .map_err(|e| CliError::load(segment.clone(), e.to_string()))?;

    println!("# {}\t{}\t{}", model.id, model.start, model.stop);
    for band in &model.bands {
        println!("{}\t{}\t{}\t{}", band.id, band.band_type.stain(), band.start_pos, band.end_pos);
    }
    Ok(())
}

fn cmd_config(output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => write_example_config(&path)?,
        None => print!("{}", Config::example_toml()?),
    }
    Ok(())
}

fn write_example_config(path: &Path) -> Result<()> {
    Config::default()
        .save_to_file(path)
        .with_context(|| format!("Could not create {}", path.display()))?;
    log::info!("Wrote example configuration to {}", path.display());
    Ok(())
}
