use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use spritz::{
    ComponentTemplate, Config, DEFAULT_CONFIG_FILE, NoopOptimizer, Optimizer, SpritzError,
    SvgoOptimizer, compile,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "spritz", version)]
#[command(about = "Compile a directory of SVG icons into a symbol sprite", long_about = None)]
struct Cli {
    /// Config file (default: ./spritz.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory containing the icons
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Sprite file to write
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Symbol id prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Do not run the external optimizer
    #[arg(long)]
    no_optimize: bool,

    /// Optimizer program to run instead of svgo
    #[arg(long, value_name = "PROGRAM")]
    svgo: Option<String>,

    /// Do not copy component templates
    #[arg(long)]
    no_components: bool,

    /// Also write the bundled Blade icon component to this path
    #[arg(long, value_name = "PATH")]
    blade_component: Option<PathBuf>,

    /// More output (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let mut message = e.to_string();
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                message.push_str(": ");
                message.push_str(&cause.to_string());
                source = cause.source();
            }
            error!("{}", message);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: Cli) -> Result<(), SpritzError> {
    let (mut config, project_root) = load_config(cli.config.as_deref())?;

    if let Some(source) = cli.source {
        config.source = source;
    }
    if let Some(output) = cli.output {
        config.output = output;
    }
    if let Some(prefix) = cli.prefix {
        config.symbol.prefix = prefix;
    }
    if let Some(program) = cli.svgo {
        config.optimizer.program = program;
    }
    if cli.no_optimize {
        config.optimizer.enabled = false;
    }
    if cli.no_components {
        config.components.clear();
    }
    if let Some(destination) = cli.blade_component {
        config.components.push(ComponentTemplate::blade(destination));
    }

    let optimizer: Box<dyn Optimizer> = if config.optimizer.enabled {
        Box::new(SvgoOptimizer::locate(
            &config.optimizer.program,
            &project_root,
            config.optimizer.args.clone(),
        )?)
    } else {
        Box::new(NoopOptimizer)
    };

    let report = compile(&config, optimizer.as_ref())?;

    println!(
        "Icon sprite generated: {} symbols -> {}",
        report.symbols.len(),
        report.output.display()
    );
    Ok(())
}

/// Load the explicit config, or `spritz.toml` from the working directory if
/// it exists. Returns the config and the directory it belongs to.
fn load_config(explicit: Option<&Path>) -> Result<(Config, PathBuf), SpritzError> {
    let cwd = PathBuf::from(".");
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = cwd.join(DEFAULT_CONFIG_FILE);
            if !default.is_file() {
                return Ok((Config::default(), cwd));
            }
            default
        }
    };

    let config = Config::from_file(&path)?;
    let root = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => cwd,
    };
    Ok((config, root))
}
