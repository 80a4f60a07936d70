//! skema-drv - The `skema` binary.
//!
//! Wires the interpreter subsystems into a session: parse the command
//! line, build a machine over the chosen streams, then loop reading
//! one toplevel form and evaluating it. With a script argument the
//! program runs silently; without one it is a REPL that echoes each
//! value. End of input is the normal way out and exits 0; fatal
//! conditions (out of memory, token overflow, stream failures) exit 1
//! through the error path in `main`.

pub mod logging;

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use sgc::HeapConfig;
use skema_eval::Machine;
use tracing::debug;

/// A small Lisp interpreter with a two-space copying collector.
#[derive(Parser, Debug)]
#[command(name = "skema", version, about)]
pub struct Cli {
    /// Script to run; reads standard input as a REPL when omitted.
    pub script: Option<PathBuf>,

    /// Cells per heap semispace.
    #[arg(long, value_name = "N")]
    pub heap_cells: Option<usize>,

    /// Capacity of the collector's root registry.
    #[arg(long, value_name = "N")]
    pub root_slots: Option<usize>,

    /// Log collector and session activity to stderr.
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    fn heap_config(&self) -> HeapConfig {
        let mut config = HeapConfig::default();
        if let Some(n) = self.heap_cells {
            config.heap_cells = n;
        }
        if let Some(n) = self.root_slots {
            config.root_slots = n;
        }
        config
    }
}

/// Run one session to completion.
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    logging::init(cli.verbose).context("cannot initialize logging")?;
    let config = cli.heap_config();

    let (input, echo): (Box<dyn Read>, bool) = match &cli.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("cannot open script {}", path.display()))?;
            (Box::new(file), false)
        }
        None => (Box::new(io::stdin()), true),
    };
    let output: Box<dyn Write> = Box::new(io::stdout());

    let mut machine = Machine::new(config, input, output).context("cannot start interpreter")?;

    loop {
        let expr = match machine.read_value() {
            Ok(expr) => expr,
            Err(e) if e.is_eof() => {
                debug!("session: clean end of input");
                report_diagnostics(&machine);
                return Ok(());
            }
            Err(e) => return Err(anyhow::Error::new(e).context("reading input")),
        };
        report_diagnostics(&machine);

        let value = machine.eval_value(expr).context("evaluating input")?;

        if echo {
            machine.write_value(value).context("writing result")?;
            machine.write_newline().context("writing result")?;
        }
    }
}

/// Show reader diagnostics on stderr; the session continues past them.
fn report_diagnostics(machine: &Machine) {
    for diagnostic in machine.drain_diagnostics() {
        eprintln!("read {}", diagnostic);
    }
}
