//! Selector simulator
//!
//! Replays a script of picker actions against a JSON catalog and prints the
//! resulting results page, selection and notifications.
//!
//! ```text
//! selector-sim run --catalog repos.json open search:climate toggle:https://repo.example/3
//! selector-sim config --config selector.toml
//! ```

mod catalog;
mod script;
mod session;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use selector_core::{
    EntityAdapter, Item, MetadataStandardAdapter, RepositoryAdapter, SelectorConfig,
};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::script::Step;
use crate::session::Session;

fn cli() -> Command {
    let config_arg = Arg::new("config")
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .help("TOML selector configuration");

    Command::new("selector-sim")
        .version(selector_core::VERSION)
        .about("Scripted pickable-item selector sessions")
        .subcommand_required(true)
        .subcommand(
            Command::new("run")
                .about("Replay script steps against a catalog")
                .arg(
                    Arg::new("catalog")
                        .long("catalog")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON array of catalog records"),
                )
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .default_value("repository")
                        .value_parser(["repository", "metadata-standard"])
                        .help("Entity kind the catalog holds"),
                )
                .arg(config_arg.clone())
                .arg(
                    Arg::new("selected")
                        .long("selected")
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON array of already selected items"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                )
                .arg(
                    Arg::new("steps")
                        .num_args(0..)
                        .value_parser(value_parser!(String))
                        .help("Steps such as open, search:term, page:2, toggle:uri, custom:name|uri|description"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Print the effective configuration")
                .arg(config_arg),
        )
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "selector_core=info,selector_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(args: &ArgMatches) -> anyhow::Result<SelectorConfig> {
    match args.get_one::<PathBuf>("config") {
        Some(path) => SelectorConfig::from_file(path)
            .with_context(|| format!("loading configuration {}", path.display())),
        None => Ok(SelectorConfig::default()),
    }
}

fn load_selected(args: &ArgMatches) -> anyhow::Result<Vec<Item>> {
    match args.get_one::<PathBuf>("selected") {
        Some(path) => catalog::load_records(path),
        None => Ok(Vec::new()),
    }
}

async fn run<A>(args: &ArgMatches) -> anyhow::Result<()>
where
    A: EntityAdapter,
    A::Record: DeserializeOwned,
{
    let config = load_config(args)?;
    let steps = args
        .get_many::<String>("steps")
        .unwrap_or_default()
        .map(|raw| raw.parse::<Step>())
        .collect::<anyhow::Result<Vec<_>>>()?;

    let catalog_path = args
        .get_one::<PathBuf>("catalog")
        .context("--catalog is required")?;
    let records = catalog::load_records::<A::Record>(catalog_path)?;

    let session = Session::<A>::new(config, records, load_selected(args)?)?;
    session.run(&steps).await?;

    let report = session.report();
    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("run", args)) => match args.get_one::<String>("kind").map(String::as_str) {
            Some("metadata-standard") => run::<MetadataStandardAdapter>(args).await,
            _ => run::<RepositoryAdapter>(args).await,
        },
        Some(("config", args)) => {
            let config = load_config(args)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        _ => anyhow::bail!("a subcommand is required"),
    }
}
