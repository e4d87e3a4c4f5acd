//! procwatch - run a program and wait for lines in its output
//!
//! Starts the given program, waits for each requested pattern in order,
//! then stops it and prints what it wrote.

use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use tracing::{debug, error, info, warn};

use procwatch::{Command, ConfigLoader, Pattern, ProcessSession, TraceMode};

/// Exit code when a pattern did not show up in time
const EXIT_TIMEOUT: i32 = 2;

/// Command line arguments
#[derive(Debug, Default)]
struct CliArgs {
    /// Configuration file path
    config_path: Option<PathBuf>,
    /// Patterns to wait for, in order
    patterns: Vec<String>,
    /// Treat patterns as regular expressions
    regex: bool,
    /// Budget for each wait
    timeout: Option<Duration>,
    /// Keep the child running this long after the last match
    hold: Option<Duration>,
    /// Trace printing override
    traces: Option<TraceMode>,
    /// Enable debug logging
    debug: bool,
    help: bool,
    version: bool,
    /// Program and its arguments
    command: Vec<String>,
}

impl CliArgs {
    /// Parse command line arguments
    fn parse() -> anyhow::Result<Self> {
        Self::parse_from(env::args().skip(1))
    }

    fn parse_from<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut cli = CliArgs::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    cli.config_path = Some(PathBuf::from(next_value(&mut args, &arg)?));
                }
                "--wait" | "-w" => {
                    cli.patterns.push(next_value(&mut args, &arg)?);
                }
                "--regex" | "-r" => {
                    cli.regex = true;
                }
                "--timeout" | "-t" => {
                    cli.timeout = Some(parse_seconds(&next_value(&mut args, &arg)?)?);
                }
                "--hold" => {
                    cli.hold = Some(parse_seconds(&next_value(&mut args, &arg)?)?);
                }
                "--traces" => {
                    cli.traces = Some(next_value(&mut args, &arg)?.parse()?);
                }
                "--debug" | "-d" => {
                    cli.debug = true;
                }
                "--help" | "-h" => {
                    cli.help = true;
                }
                "--version" | "-v" => {
                    cli.version = true;
                }
                "--" => {
                    cli.command.extend(args.by_ref());
                }
                flag if flag.starts_with('-') => {
                    bail!("Unknown option: {}", flag);
                }
                _ => {
                    cli.command.push(arg);
                    cli.command.extend(args.by_ref());
                }
            }
        }

        if cli.command.is_empty() && !cli.help && !cli.version {
            bail!("Missing program to run");
        }
        Ok(cli)
    }
}

fn next_value<I: Iterator<Item = String>>(args: &mut I, flag: &str) -> anyhow::Result<String> {
    args.next().ok_or_else(|| anyhow!("Missing value for {}", flag))
}

fn parse_seconds(value: &str) -> anyhow::Result<Duration> {
    let secs: f64 = value
        .parse()
        .with_context(|| format!("Invalid number of seconds: {}", value))?;
    Duration::try_from_secs_f64(secs)
        .with_context(|| format!("Invalid number of seconds: {}", value))
}

fn print_help() {
    println!("procwatch v{}", procwatch::VERSION);
    println!();
    println!("USAGE:");
    println!("    procwatch [OPTIONS] -- PROGRAM [ARGS...]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <PATH>      Configuration file (TOML)");
    println!("    -w, --wait <PATTERN>     Wait for PATTERN on stdout (repeatable, in order)");
    println!("    -r, --regex              Treat patterns as regular expressions");
    println!("    -t, --timeout <SECS>     Budget for each wait");
    println!("        --hold <SECS>        Keep the program running after the last match");
    println!("        --traces <MODE>      Print captured output: none, target, all");
    println!("    -d, --debug              Enable debug logging");
    println!("    -h, --help               Print help information");
    println!("    -v, --version            Print version information");
    println!();
    println!("EXIT CODES:");
    println!("    0  every pattern was seen");
    println!("    1  launch, configuration or usage error");
    println!("    2  a pattern did not appear in time");
    println!();
    println!("ENVIRONMENT:");
    println!("    PROCWATCH_CONFIG       Configuration file path");
    println!("    PROCWATCH_DEBUG        Enable debug mode (1 or true)");
    println!("    RUST_LOG               Set logging level (error, warn, info, debug, trace)");
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse().unwrap_or_else(|e| {
        eprintln!("Error: {:#}", e);
        print_help();
        process::exit(1);
    });

    if args.help {
        print_help();
        return;
    }
    if args.version {
        println!("procwatch v{}", procwatch::VERSION);
        return;
    }

    if let Err(e) = procwatch::logging::init(args.debug) {
        eprintln!("{}", e);
    }
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("{:#}", e);
            process::exit(1);
        }
    }
}

async fn run(args: CliArgs) -> anyhow::Result<i32> {
    let config = ConfigLoader::new()
        .load(args.config_path.as_deref())
        .context("Failed to load configuration")?;
    let traces = args.traces.unwrap_or(config.traces);
    let timeout = args.timeout.unwrap_or_else(|| config.default_wait_timeout());

    let patterns = args
        .patterns
        .iter()
        .map(|p| {
            if args.regex {
                Pattern::regex(p)
            } else {
                Ok(Pattern::from(p.as_str()))
            }
        })
        .collect::<procwatch::Result<Vec<_>>>()?;

    let command = Command::new(args.command)?;
    let mut session = ProcessSession::start_with_config(command, &config)?;

    let mut exit_code = 0;
    for pattern in patterns {
        let shown = pattern.to_string();
        match session.wait(pattern, timeout).await {
            Ok(()) => info!("Saw \"{}\"", shown),
            Err(e) if e.is_timeout() => {
                error!("{}", e);
                exit_code = EXIT_TIMEOUT;
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    if exit_code == 0 {
        if let Some(hold) = args.hold {
            debug!("Holding for {:?}", hold);
            tokio::time::sleep(hold).await;
        }
    }

    session.terminate();
    for e in session.take_pump_errors() {
        warn!("{}", e);
    }

    let mut stdout = std::io::stdout().lock();
    procwatch::write_traces(&mut stdout, traces, &session.snapshot())?;
    stdout.flush()?;

    let stderr_lines: Vec<String> = session
        .stderr_snapshot()
        .into_iter()
        .map(|line| format!("stderr: {}", line))
        .collect();
    procwatch::write_traces(&mut std::io::stderr().lock(), traces, &stderr_lines)?;

    Ok(exit_code)
}
