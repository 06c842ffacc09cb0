//! carry-vm: headless runner for carry machine puzzles

use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::process;

use carry_vm::config::Config;
use carry_vm::engine::{Action, ControlAction, Player, ProgramState, Session, Snapshot, Speed};
use carry_vm::isa::{format_program, parse_program, Instruction};
use carry_vm::level::Level;

const USAGE: &str = "\
Usage: carry-vm [OPTIONS] [PROGRAM_FILE]

Runs a program against a puzzle level and prints every step.
PROGRAM_FILE is a listing (`LOAD; COPY_TO 0; ...`) or, with a .json
extension, an array of instruction actions. Without it the level's
reference solution runs.

Options:
  --level <NAME>     Level to play (default from config, else `double`)
  --speed <1-10>     Auto-play speed
  --fast             Step without delays
  --json             Print snapshots as JSON lines
  --list-levels      Show the built-in levels
  --sample-config    Print a sample config file
  -h, --help         Show this help";

#[derive(Debug, Default)]
struct Options {
    level: Option<String>,
    speed: Option<Speed>,
    program: Option<PathBuf>,
    fast: bool,
    json: bool,
    list_levels: bool,
    sample_config: bool,
    help: bool,
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut opts = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--level" => {
                let name = iter.next().ok_or_else(|| anyhow!("--level needs a level name"))?;
                opts.level = Some(name.clone());
            }
            "--speed" => {
                let value = iter.next().ok_or_else(|| anyhow!("--speed needs a value"))?;
                let raw: u8 = value
                    .parse()
                    .with_context(|| format!("Invalid speed: {}", value))?;
                opts.speed = Some(Speed::try_from(raw)?);
            }
            "--fast" => opts.fast = true,
            "--json" => opts.json = true,
            "--list-levels" => opts.list_levels = true,
            "--sample-config" => opts.sample_config = true,
            "-h" | "--help" => opts.help = true,
            flag if flag.starts_with('-') => bail!("Unknown option: {}\n\n{}", flag, USAGE),
            path => {
                if opts.program.is_some() {
                    bail!("Only one program file may be given");
                }
                opts.program = Some(PathBuf::from(path));
            }
        }
    }

    Ok(opts)
}

fn load_program(path: &Path) -> Result<Vec<Instruction>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let program = if path.extension().is_some_and(|ext| ext == "json") {
        Action::program_from_json(&text)?
    } else {
        parse_program(&text)?
    };

    if program.is_empty() {
        bail!("{} contains no instructions", path.display());
    }
    Ok(program)
}

fn list_levels() {
    println!("{:<16} {:>6} {:>6}  INSTRUCTIONS", "LEVEL", "INPUTS", "MEMORY");
    for level in Level::catalog() {
        let ops: Vec<&str> = level.instructions.iter().map(|op| op.mnemonic()).collect();
        println!(
            "{:<16} {:>6} {:>6}  {}",
            level.name,
            level.input_count,
            level.memory_size,
            ops.join(" ")
        );
        println!("{:<16} {}", "", level.description);
    }
}

fn print_snapshot(snapshot: &Snapshot, json: bool) {
    if json {
        match serde_json::to_string(snapshot) {
            Ok(line) => println!("{}", line),
            Err(e) => log::error!("Failed to encode snapshot: {}", e),
        }
    } else {
        println!("{}", snapshot);
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let opts = parse_args(&args)?;

    if opts.help {
        println!("{}", USAGE);
        return Ok(());
    }
    if opts.sample_config {
        print!("{}", Config::sample_config());
        return Ok(());
    }
    if opts.list_levels {
        list_levels();
        return Ok(());
    }

    let config = Config::get();
    let level = Level::by_name(opts.level.as_deref().unwrap_or(config.level()))?;
    let speed = opts.speed.unwrap_or_else(|| config.speed());

    let program = match opts.program.or_else(|| config.program_path()) {
        Some(path) => load_program(&path)?,
        None => {
            let solution = level
                .solution
                .ok_or_else(|| anyhow!("Level {} has no reference solution; pass a program file", level.name))?;
            parse_program(solution)?
        }
    };

    let init = level.initialize()?;
    let json = opts.json;

    if !json {
        println!("Level:    {} ({})", level.name, level.description);
        println!("Input:    {:?}", init.input.iter().map(|v| v.to_string()).collect::<Vec<_>>());
        println!("Expected: {:?}", init.output.iter().map(|v| v.to_string()).collect::<Vec<_>>());
        println!("Program:");
        for (i, line) in format_program(&program).lines().enumerate() {
            println!("  {:>3}: {}", i, line);
        }
        println!();
    }

    let mut player = Player::new(Session::new(init, program, speed));
    print_snapshot(&player.snapshot(), json);

    if opts.fast {
        player.run_to_end(config.max_steps(), |snapshot| print_snapshot(snapshot, json));
    } else {
        player.dispatch(ControlAction::Play);
        player.run_until_idle(|snapshot| print_snapshot(snapshot, json));
    }

    match player.session().state() {
        ProgramState::Finished => {
            if !json {
                println!("Finished.");
            }
            Ok(())
        }
        ProgramState::Error(err) => {
            eprintln!("Error: {}", err);
            process::exit(1);
        }
        other => {
            eprintln!("Stopped in state {} after {} steps", other, config.max_steps());
            process::exit(1);
        }
    }
}
