//! Launching scenarios: directly with a caller-supplied vector, or after an
//! interactive session.
use crate::prompt::{KeySource, Session, SessionOutcome};
use crate::registry::{Registry, Scenario};
use crate::surface;
use anyhow::{Context, Result};
use std::io::Write;
use std::process::{Child, Command, ExitStatus};
use std::sync::atomic::{AtomicBool, Ordering};

/// Set while a scenario child owns the terminal.
static CHILD_ACTIVE: AtomicBool = AtomicBool::new(false);

/// How a launched scenario finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchReport {
    Succeeded,
    Failed { detail: String },
}

/// Make Ctrl-C end the dispatcher cleanly.
///
/// While a child runs the signal is left to the child, and its failure is
/// reported like any other.
pub fn install_interrupt_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        if CHILD_ACTIVE.load(Ordering::SeqCst) {
            return;
        }
        let _ = crossterm::terminal::disable_raw_mode();
        println!("\n[INFO] Exiting...");
        std::process::exit(0);
    })
    .context("install interrupt handler")
}

/// Run the full interactive flow: pick, elicit, confirm, launch.
pub fn run_interactive(
    registry: &Registry,
    keys: &mut dyn KeySource,
    out: &mut dyn Write,
) -> Result<()> {
    let mut session = Session::new(keys, out);
    session.banner()?;

    let Some(name) = session.select_scenario(&registry.names())? else {
        return report_interrupt();
    };
    let scenario = registry.resolve(&name)?;
    let set = surface::discover(scenario);
    if set.is_empty() {
        tracing::warn!(scenario = %scenario.name, "no arguments discovered");
    }

    match session.run(&scenario.name, &set)? {
        SessionOutcome::Dispatch(argv) => {
            let report = launch(scenario, &argv)?;
            print_report(scenario, &report);
            Ok(())
        }
        SessionOutcome::Cancelled | SessionOutcome::NoArguments => Ok(()),
        SessionOutcome::Interrupted => report_interrupt(),
    }
}

/// Launch a named scenario with a ready-made vector, skipping discovery.
pub fn run_direct(registry: &Registry, name: &str, argv: &[String]) -> Result<()> {
    let scenario = registry.resolve(name)?;
    let report = launch(scenario, argv)?;
    print_report(scenario, &report);
    Ok(())
}

fn report_interrupt() -> Result<()> {
    println!("\n[INFO] Exiting...");
    Ok(())
}

fn print_report(scenario: &Scenario, report: &DispatchReport) {
    if let DispatchReport::Failed { detail } = report {
        eprintln!(
            "[ERROR] Script '{}' failed with {detail}",
            scenario.program.display()
        );
    }
}

/// Spawn the scenario, wait for it, and classify its exit.
pub fn launch(scenario: &Scenario, argv: &[String]) -> Result<DispatchReport> {
    let mut command = build_command(scenario, argv)?;
    tracing::info!(
        scenario = %scenario.name,
        program = %scenario.program.display(),
        args = argv.len(),
        "launching scenario"
    );
    let child = ChildHandle::spawn(&mut command)
        .with_context(|| format!("launch scenario {}", scenario.name))?;
    let status = child
        .wait()
        .with_context(|| format!("wait for scenario {}", scenario.name))?;
    tracing::info!(scenario = %scenario.name, %status, "scenario exited");

    if status.success() {
        Ok(DispatchReport::Succeeded)
    } else {
        Ok(DispatchReport::Failed {
            detail: status.to_string(),
        })
    }
}

fn build_command(scenario: &Scenario, argv: &[String]) -> Result<Command> {
    let mut command = match scenario.interpreter.split_first() {
        Some((interpreter, interpreter_args)) => {
            let resolved = which::which(interpreter)
                .with_context(|| format!("locate interpreter {interpreter}"))?;
            let mut command = Command::new(resolved);
            command.args(interpreter_args).arg(&scenario.program);
            command
        }
        None => Command::new(&scenario.program),
    };
    command.args(argv);
    Ok(command)
}

/// A spawned scenario that is always reaped.
///
/// Dropping a handle that was never waited on kills and reaps the child.
struct ChildHandle {
    child: Child,
    reaped: bool,
}

impl ChildHandle {
    fn spawn(command: &mut Command) -> Result<Self> {
        let child = command.spawn()?;
        CHILD_ACTIVE.store(true, Ordering::SeqCst);
        Ok(Self {
            child,
            reaped: false,
        })
    }

    fn wait(mut self) -> Result<ExitStatus> {
        let status = self.child.wait()?;
        self.reaped = true;
        Ok(status)
    }
}

impl Drop for ChildHandle {
    fn drop(&mut self) {
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
        CHILD_ACTIVE.store(false, Ordering::SeqCst);
    }
}
