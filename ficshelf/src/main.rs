mod verbose;

use std::path::Path;

use clap::{ArgMatches, CommandFactory as _, FromArgMatches as _, Parser, Subcommand};
use tracing_error::ErrorLayer;
use tracing_subscriber::{prelude::*, EnvFilter, Registry};
use twelf::Layer;

use ficshelf_common::Conf;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    #[clap(flatten)]
    verbose: verbose::Verbosity,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database if needed and apply migrations
    Migrate,
    /// Start the web server
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), ficshelf_common::Report> {
    ficshelf_common::install()?;

    let matches = Cli::command().args(&Conf::clap_args()).get_matches();
    let cli = Cli::from_arg_matches(&matches)?;
    let conf = Conf::with_layers(&layers(matches))?;

    let subscriber = Registry::default()
        .with(ErrorLayer::default())
        .with(tracing_subscriber::fmt::Layer::default())
        .with(EnvFilter::from_default_env().add_directive(cli.verbose.log_level_filter().into()));

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Migrate => ficshelf_command_migrate::run(&conf).await?,
        Commands::Serve => ficshelf_command_serve::run(&conf).await?,
    }

    Ok(())
}

/// Config files only join the stack when they exist, env and flags always do.
fn layers(matches: ArgMatches) -> Vec<Layer> {
    let mut layers = Vec::with_capacity(4);

    if Path::new("ficshelf.json").exists() {
        layers.push(Layer::Json("ficshelf.json".into()));
    }

    if Path::new("ficshelf.toml").exists() {
        layers.push(Layer::Toml("ficshelf.toml".into()));
    }

    layers.push(Layer::Env(Some("FICSHELF_".to_string())));
    layers.push(Layer::Clap(matches));

    layers
}
