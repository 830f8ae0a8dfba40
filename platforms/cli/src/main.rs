mod config;

use clap::{Parser, Subcommand};
use config::RunnerConfig;
use serde::Serialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tmsim::engine;
use tmsim::types::{DefinitionSummary, RUN_TO_HALT};
use tmsim::{
    analyze, Cell, ProgramLoader, ProgramManager, RunRequest, Snapshot, TuringMachine,
    TuringMachineError,
};

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
#[clap(after_help = "EXAMPLES:
  tmsim-cli examples --show 'Parity of 1s' > parity.tm
  tmsim-cli init parity.tm --input 1001 | tmsim-cli run --steps 3 | tmsim-cli window")]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Step budget for a single invocation (overrides tmsim.toml and TMSIM_MAX_STEPS)
    #[clap(long, global = true)]
    max_steps: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Check a specification file and summarize it
    Validate {
        /// Specification file, or `-` for stdin
        spec: String,
        /// Fail when the definition references undeclared or unreachable states
        #[clap(long)]
        strict: bool,
    },
    /// Parse a specification and print the initial snapshot
    Init {
        /// Specification file, or `-` for stdin
        spec: String,
        /// The input written on the tape from cell 0
        #[clap(short, long, default_value = "")]
        input: String,
    },
    /// Apply one step to a snapshot
    Step {
        /// Snapshot file; read from stdin when omitted
        snapshot: Option<PathBuf>,
    },
    /// Run a snapshot for a number of steps
    Run {
        /// Snapshot file; read from stdin when omitted
        snapshot: Option<PathBuf>,
        /// Steps to execute; -1 runs until the machine halts
        #[clap(short, long, default_value_t = RUN_TO_HALT, allow_hyphen_values = true)]
        steps: i64,
    },
    /// Print the tape cells around the head
    Window {
        /// Snapshot file; read from stdin when omitted
        snapshot: Option<PathBuf>,
        /// Cells shown on each side of the head
        #[clap(long)]
        span: Option<usize>,
    },
    /// Execute a specification on an input until it halts
    Exec {
        /// Specification file, or `-` for stdin
        spec: String,
        /// The input written on the tape from cell 0
        #[clap(short, long, default_value = "")]
        input: String,
        /// Print each step of the execution
        #[clap(short = 'd', long)]
        debug: bool,
    },
    /// List bundled example machines, or print one
    Examples {
        /// Only list examples whose name contains this text
        #[clap(long)]
        query: Option<String>,
        /// Print the specification of the named example
        #[clap(long)]
        show: Option<String>,
    },
}

#[derive(Serialize)]
struct ValidateResponse {
    #[serde(flatten)]
    summary: DefinitionSummary,
    warnings: Vec<String>,
}

#[derive(Serialize)]
struct RunResponse {
    machine: Snapshot,
    steps_executed: usize,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = RunnerConfig::load();
    if let Some(max_steps) = cli.max_steps {
        config.max_steps = max_steps;
    }
    log::debug!("Runner config: {:?}", config);

    if let Err(e) = execute(cli.command, &config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn execute(command: Command, config: &RunnerConfig) -> Result<(), TuringMachineError> {
    match command {
        Command::Validate { spec, strict } => {
            let definition = tmsim::parse(&read_spec(&spec)?)?;
            let findings = analyze(&definition);

            if (strict || config.strict) && !findings.is_empty() {
                return Err(findings[0].clone().into());
            }

            print_json(&ValidateResponse {
                summary: definition.summary(),
                warnings: findings.iter().map(ToString::to_string).collect(),
            })
        }
        Command::Init { spec, input } => {
            let snapshot = engine::load(&read_spec(&spec)?, &input)?;
            println!("{}", snapshot.to_json()?);
            Ok(())
        }
        Command::Step { snapshot } => {
            let snapshot = engine::step(read_snapshot(snapshot.as_deref())?)?;
            println!("{}", snapshot.to_json()?);
            Ok(())
        }
        Command::Run { snapshot, steps } => {
            let (machine, steps_executed) = engine::run(
                read_snapshot(snapshot.as_deref())?,
                RunRequest::from(steps),
                config.max_steps,
            )?;
            print_json(&RunResponse {
                machine,
                steps_executed,
            })
        }
        Command::Window { snapshot, span } => {
            let snapshot = read_snapshot(snapshot.as_deref())?;
            let cells = engine::window(&snapshot, span.unwrap_or(config.span))?;
            print!("{}", render_window(&cells));
            match snapshot.result {
                Some(result) => println!("state: {} ({})", snapshot.current_state, result),
                None => println!("state: {}", snapshot.current_state),
            }
            Ok(())
        }
        Command::Exec { spec, input, debug } => {
            let definition = tmsim::parse(&read_spec(&spec)?)?;
            let mut machine = TuringMachine::new(Arc::new(definition), &input);

            let steps = if debug {
                trace_run(&mut machine, config.max_steps)
            } else {
                machine.run(config.max_steps)
            };

            if let Some(result) = machine.result() {
                println!("{} after {} steps", result, steps);
            }
            println!("{}", machine.tape_contents());
            Ok(())
        }
        Command::Examples { query, show } => {
            if let Some(name) = show {
                print!("{}", ProgramManager::get_program_by_name(&name)?.text);
                return Ok(());
            }

            let indices = match query {
                Some(query) => ProgramManager::search_programs(&query),
                None => (0..ProgramManager::get_program_count()).collect(),
            };
            for index in indices {
                let info = ProgramManager::get_program_info(index)?;
                println!(
                    "{:>2}. {} ({} states, {} transitions)",
                    info.index + 1,
                    info.name,
                    info.state_count,
                    info.transition_count
                );
            }
            Ok(())
        }
    }
}

/// Runs like `TuringMachine::run`, printing the configuration after every step.
fn trace_run(machine: &mut TuringMachine, max_steps: usize) -> usize {
    fn print_state(machine: &TuringMachine) {
        println!(
            "State: {}, Head: {}, Tape: [{}]",
            machine.state(),
            machine.head(),
            machine.tape_contents()
        );
    }

    print_state(machine);
    machine.run_with(max_steps, print_state)
}

/// Renders cells as a symbol row with a caret under the head.
fn render_window(cells: &[Cell]) -> String {
    let symbols: Vec<String> = cells.iter().map(|cell| cell.symbol.to_string()).collect();
    let caret: Vec<&str> = cells
        .iter()
        .map(|cell| if cell.is_head { "^" } else { " " })
        .collect();

    format!("{}\n{}\n", symbols.join(" "), caret.join(" ").trim_end())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), TuringMachineError> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn read_spec(spec: &str) -> Result<String, TuringMachineError> {
    if spec == "-" {
        read_stdin()
    } else {
        ProgramLoader::read_text(Path::new(spec))
    }
}

fn read_snapshot(path: Option<&Path>) -> Result<Snapshot, TuringMachineError> {
    let json = match path {
        Some(path) if path != Path::new("-") => ProgramLoader::read_text(path)?,
        _ => read_stdin()?,
    };
    Snapshot::from_json(&json)
}

fn read_stdin() -> Result<String, TuringMachineError> {
    if atty::is(atty::Stream::Stdin) {
        return Err(TuringMachineError::FileError(
            "Expected input on stdin, but stdin is a terminal".to_string(),
        ));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| TuringMachineError::FileError(format!("Failed to read stdin: {}", e)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_window() {
        let cells = [
            Cell {
                position: -1,
                symbol: '_',
                is_head: false,
            },
            Cell {
                position: 0,
                symbol: '1',
                is_head: true,
            },
            Cell {
                position: 1,
                symbol: '0',
                is_head: false,
            },
        ];

        assert_eq!(render_window(&cells), "_ 1 0\n  ^\n");
    }

    #[test]
    fn test_cli_parses_run_to_halt_sentinel() {
        let cli = Cli::parse_from(["tmsim-cli", "run", "snap.json", "--steps", "-1"]);

        match cli.command {
            Command::Run { snapshot, steps } => {
                assert_eq!(snapshot, Some(PathBuf::from("snap.json")));
                assert_eq!(RunRequest::from(steps), RunRequest::ToHalt);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_cli_global_max_steps() {
        let cli = Cli::parse_from(["tmsim-cli", "exec", "m.tm", "-i", "101", "--max-steps", "9"]);

        assert_eq!(cli.max_steps, Some(9));
        assert!(matches!(cli.command, Command::Exec { debug: false, .. }));
    }
}
