use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use helpfmt_core::CommandSpec;
use helpfmt_render::{FormatterConfig, HelpStyle, format_help, format_usage};

#[derive(Debug, Parser)]
#[command(name = "helpfmt", version, disable_help_subcommand = true)]
#[command(about = "Render usage and help text from a command spec")]
struct Cli {
    /// Emit debug logs on stderr (overridden by RUST_LOG).
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the usage block of a command spec.
    Usage(RenderArgs),
    /// Print the full help document of a command spec.
    Help(RenderArgs),
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Command spec file (JSON, or YAML with a .yaml/.yml extension).
    #[arg(long)]
    spec: PathBuf,
    /// Formatter configuration YAML file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output width in columns (default: terminal width minus 2).
    #[arg(long)]
    width: Option<usize>,
    /// Cap on the help column.
    #[arg(long)]
    max_help_position: Option<usize>,
    /// Layout style for text and help strings.
    #[arg(long, value_enum)]
    style: Option<HelpStyle>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Usage(args) => run_usage(args),
        Command::Help(args) => run_help(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let directive = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let subscriber = fmt::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run_usage(args: RenderArgs) -> Result<(), String> {
    let (spec, config) = load_inputs(&args)?;
    let usage = format_usage(&spec, &config).map_err(|err| err.to_string())?;
    print!("{}", usage.trim_end_matches('\n'));
    println!();
    Ok(())
}

fn run_help(args: RenderArgs) -> Result<(), String> {
    let (spec, config) = load_inputs(&args)?;
    let help = format_help(&spec, &config).map_err(|err| err.to_string())?;
    print!("{help}");
    Ok(())
}

fn load_inputs(args: &RenderArgs) -> Result<(CommandSpec, FormatterConfig), String> {
    let spec = load_spec(&args.spec)?;

    let mut config = match &args.config {
        Some(path) => FormatterConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => FormatterConfig::default(),
    };
    if let Some(width) = args.width {
        config = config.with_width(width);
    }
    if let Some(position) = args.max_help_position {
        config = config.with_max_help_position(position);
    }
    if let Some(style) = args.style {
        config = config.with_style(style);
    }
    config.validate().map_err(|err| err.to_string())?;

    tracing::debug!(prog = %spec.prog, config = ?config, "Loaded render inputs");
    Ok((spec, config))
}

fn load_spec(path: &Path) -> Result<CommandSpec, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
        serde_yaml::from_str(&raw)
            .map_err(|err| format!("Failed to parse spec '{}': {err}", path.display()))
    } else {
        serde_json::from_str(&raw)
            .map_err(|err| format!("Failed to parse spec '{}': {err}", path.display()))
    }
}
