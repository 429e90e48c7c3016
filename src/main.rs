use anyhow::Result;
use clap::Parser;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod assemble;
mod cli;
mod descriptor;
mod dispatch;
mod prompt;
mod registry;
mod surface;

use cli::RootArgs;
use registry::{Registry, UnknownScenario};

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "SKYWALKER_LOG";

fn main() -> ExitCode {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if err.downcast_ref::<UnknownScenario>().is_some() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "skywalker=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();
}

fn run(args: RootArgs) -> Result<()> {
    let registry = registry::load_registry(args.registry.as_deref())?;
    if args.list {
        print_registry(&registry);
        return Ok(());
    }

    dispatch::install_interrupt_handler()?;
    match args.scenario {
        Some(name) if args.surface => print_surface(&registry, &name),
        Some(name) => dispatch::run_direct(&registry, &name, &args.args),
        None => {
            let mut keys = prompt::stdin_keys();
            let mut out = io::stdout();
            dispatch::run_interactive(&registry, keys.as_mut(), &mut out)
        }
    }
}

fn print_registry(registry: &Registry) {
    if let Some(source) = registry.source() {
        println!("Registry: {}", source.display());
    }
    for scenario in registry.scenarios() {
        let description = scenario.description.as_deref().unwrap_or("");
        println!(
            "{:<12} {}  {}",
            scenario.name,
            scenario.program.display(),
            description
        );
    }
}

fn print_surface(registry: &Registry, name: &str) -> Result<()> {
    let scenario = registry.resolve(name)?;
    let set = surface::discover(scenario);
    println!("{}", serde_json::to_string_pretty(&set)?);
    Ok(())
}
