// Keylayer CLI
// Compiles a TOML layer definition into the remapping engine's JSON config

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use keylayer_core::{Config, KarabinerDocument};

/// Default file name when neither the CLI nor the config names one
const DEFAULT_OUTPUT: &str = "karabiner.json";

/// Leader-key layer compiler
#[derive(Parser, Debug)]
#[command(name = "keylayer")]
#[command(author = "keylayer contributors")]
#[command(version)]
#[command(about = "Compile leader-key layers into remapping-engine rules", long_about = None)]
struct Args {
    /// TOML layer configuration (default: ~/.config/keylayer/layers.toml)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Output file, overrides [output].path
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the document to stdout instead of writing a file
    #[arg(long)]
    stdout: bool,

    /// Validate config and exit
    #[arg(long)]
    check_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Main application state
struct Application {
    config: Config,
    config_path: PathBuf,
    args: Args,
}

impl Application {
    /// Load the config named on the command line, or the default one
    fn new(args: Args) -> Result<Self> {
        let config_path = match &args.config {
            Some(path) => path.clone(),
            None => Config::default_path()
                .context("could not determine the user config directory; pass --config")?,
        };
        if !config_path.exists() {
            bail!("config file not found: {}", config_path.display());
        }

        let config = Config::from_toml_path(&config_path)
            .with_context(|| format!("failed to load {}", config_path.display()))?;

        Ok(Self {
            config,
            config_path,
            args,
        })
    }

    fn build(&self) -> Result<KarabinerDocument> {
        self.config
            .to_document()
            .with_context(|| format!("failed to compile {}", self.config_path.display()))
    }

    /// Compile without writing anything
    fn validate(&self) -> Result<()> {
        let document = self.build()?;
        println!(
            "Configuration is valid: {} rule groups",
            document.rule_count()
        );
        Ok(())
    }

    /// Output path precedence: --output > [output].path > ./karabiner.json
    fn output_path(&self) -> PathBuf {
        self.args
            .output
            .clone()
            .or_else(|| self.config.output_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }

    fn run(&self) -> Result<()> {
        let document = self.build()?;

        if self.args.stdout {
            let json = document.to_json().context("failed to serialize document")?;
            print!("{}", json);
            return Ok(());
        }

        let path = self.output_path();
        document
            .write_to(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!(
            "Wrote {} rule groups to {}",
            document.rule_count(),
            path.display()
        );
        Ok(())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let app = Application::new(args)?;

    if app.args.check_config {
        return app.validate();
    }

    app.run()
}
