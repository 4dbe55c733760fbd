//! Vaultgate CLI
//!
//! Usage:
//!   vaultgate                          # Interactive console (real time)
//!   vaultgate --demo                   # Scripted run on the virtual clock
//!   vaultgate --serve                  # HTTP API server
//!   vaultgate --config timings.json    # Override timings
//!   vaultgate --demo --json            # JSON output

use clap::Parser;
use colored::Colorize;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vaultgate::core::command::HELP;
use vaultgate::core::{execute, run_server, Command, CommandResult, Host, Pacer};
use vaultgate::types::{GateOutcome, Notice, SessionSnapshot};
use vaultgate::{Timings, VaultError, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "vaultgate",
    version = VERSION,
    about = "Vaultgate - access gate and mode transition console",
    long_about = "Vaultgate drives the vault terminal's gating state machine.\n\n\
                  Modes:\n  \
                  --interactive  Console, commands on stdin, real-time clock\n  \
                  --demo         Scripted walkthrough on the virtual clock\n  \
                  --serve        HTTP API server mode\n\n\
                  Gate:\n  \
                  NORMAL    - vault opens once the panel is unlocked\n  \
                  ELEVATED  - vault needs terminal clearance AND unlock\n\n\
                  Verification always ends in INTRUSION DETECTED and a restart."
)]
struct Args {
    /// Interactive console mode (default)
    #[arg(short, long)]
    interactive: bool,

    /// Scripted walkthrough on the virtual clock
    #[arg(short, long)]
    demo: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// JSON file overriding timings
    #[arg(long)]
    config: Option<String>,

    /// Real-time tick interval in milliseconds
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,

    /// Seed for the progress ramp
    #[arg(long)]
    seed: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(if args.serve { "info" } else { "warn" });

    if args.no_color {
        colored::control::set_override(false);
    }

    let result = if args.serve {
        run_serve(&args).await
    } else if args.demo && !args.interactive {
        load_timings(&args).map(|timings| run_demo(&args, timings))
    } else {
        match load_timings(&args) {
            Ok(timings) => run_interactive(&args, timings).await,
            Err(e) => Err(e),
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Logs go to stderr; RUST_LOG overrides the default level
fn init_tracing(default_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(env_filter)
        .init();
}

fn load_timings(args: &Args) -> Result<Timings, VaultError> {
    match &args.config {
        Some(path) => Timings::load(path),
        None => Ok(Timings::default()),
    }
}

fn new_host(args: &Args, timings: Timings) -> Host {
    match args.seed {
        Some(seed) => Host::seeded(timings, seed),
        None => Host::new(timings),
    }
}

/// Run the scripted walkthrough on the virtual clock
fn run_demo(args: &Args, timings: Timings) {
    let mut host = new_host(args, timings);
    let mut printer = NoticePrinter::new(args.json);

    print_header("Demo", args.json);

    let script = [
        ("vault click before unlock", Command::Click),
        ("terminal unlock", Command::Unlock),
        ("vault click", Command::Click),
        ("begin ELEVATED transition", Command::Transition),
        ("wait for transition", Command::Advance(timings.transition_total_ms())),
        ("vault click after elevation", Command::Click),
        ("terminal re-authorization", Command::Unlock),
        ("vault click", Command::Click),
        ("start security check", Command::Verify),
    ];

    for (label, command) in script {
        if !args.json {
            println!("{} {}", "»".cyan(), label.bold());
        }
        let result = execute(&mut host, command);
        report(&host, &result, &mut printer, args);
    }

    // Drive the check to its restart in half-second slices
    let budget_ms = timings.verification_total_ms();
    let mut spent: u64 = 0;
    while host.restarts() == 0 && spent <= budget_ms {
        let notices = host.advance(500);
        printer.print(&notices);
        spent = spent.saturating_add(500);
    }

    if !args.json {
        println!();
        println!("{} {}", "»".cyan(), "after restart".bold());
    }
    print_status(&host.session().snapshot(), args);
}

/// Run the interactive console, driving the session on real time
async fn run_interactive(args: &Args, timings: Timings) -> Result<(), VaultError> {
    let mut host = new_host(args, timings);
    let mut printer = NoticePrinter::new(args.json);

    print_header("Console", args.json);
    if !args.json {
        println!("{}", HELP);
        println!();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut interval = tokio::time::interval(Duration::from_millis(args.tick_ms.max(1)));
    let mut pacer = Pacer::new();

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let notices = host.advance(pacer.elapsed_ms());
                printer.print(&notices);
                if notices.contains(&Notice::RestartRequested) {
                    printer = NoticePrinter::new(args.json);
                    print_header("Console", args.json);
                }
            }
            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => break,
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(command) => {
                        let result = execute(&mut host, command);
                        if result == CommandResult::Quit {
                            println!("\nSession ended. Restarts: {}", host.restarts());
                            break;
                        }
                        report(&host, &result, &mut printer, args);
                    }
                    Err(e) => println!("{} {}", "⚠".yellow(), e.yellow()),
                }
            }
        }
    }
    Ok(())
}

/// Run HTTP API server
async fn run_serve(args: &Args) -> Result<(), VaultError> {
    let timings = load_timings(args)?;
    println!();
    println!("{}", "╔══════════════════════════════════════════╗".bold());
    println!("{}", format!("║  Vaultgate API Server  v{:<17}║", VERSION).bold());
    println!("{}", "╚══════════════════════════════════════════╝".bold());
    println!();

    run_server(&args.addr, timings, Duration::from_millis(args.tick_ms.max(1))).await
}

/// Print the outcome of one command
fn report(host: &Host, result: &CommandResult, printer: &mut NoticePrinter, args: &Args) {
    match result {
        CommandResult::Notices(notices) => printer.print(notices),
        CommandResult::Gate(outcome) => {
            let gate = host.session().gate();
            if args.json {
                #[derive(serde::Serialize)]
                struct ClickOutput<'a> {
                    outcome: &'a GateOutcome,
                    label: String,
                }
                let out = ClickOutput {
                    outcome,
                    label: gate.label(),
                };
                println!("{}", serde_json::to_string(&out).unwrap_or_default());
            } else {
                match outcome {
                    GateOutcome::Opened => println!("  {} {}", "✓ VAULT OPEN".green().bold(), gate.label()),
                    GateOutcome::Denied => println!(
                        "  {} {} ({})",
                        "✗ ACCESS DENIED".red().bold(),
                        gate.label(),
                        gate.reason.description()
                    ),
                }
            }
        }
        CommandResult::TabSelected(true) => {
            let panel = host.session().panel();
            println!("  tab: {:?}", panel.active_tab);
        }
        CommandResult::TabSelected(false) => println!("  {}", "vault panel is closed".yellow()),
        CommandResult::Status => print_status(&host.session().snapshot(), args),
        CommandResult::Help => println!("{}", HELP),
        CommandResult::Quit => {}
    }
}

fn print_status(snapshot: &SessionSnapshot, args: &Args) {
    if args.json {
        println!("{}", serde_json::to_string(snapshot).unwrap_or_default());
    } else if args.no_color {
        println!("{}", snapshot.to_parseable_string());
    } else {
        println!("{}", snapshot.to_terminal_string());
    }
}

fn print_header(mode: &str, json: bool) {
    if json {
        return;
    }
    println!("{}", "╔══════════════════════════════════════════╗".bold());
    println!("{}", format!("║  Vaultgate v{} - {:<24}║", VERSION, mode).bold());
    println!("{}", "╚══════════════════════════════════════════╝".bold());
    println!();
}

/// Prints notices, thinning the progress ramp to one line per 10%
struct NoticePrinter {
    json: bool,
    last_bucket: Option<u32>,
}

impl NoticePrinter {
    fn new(json: bool) -> Self {
        Self {
            json,
            last_bucket: None,
        }
    }

    fn print(&mut self, notices: &[Notice]) {
        for notice in notices {
            if let Notice::Progress { progress } = notice {
                let bucket = progress / 10;
                if self.last_bucket == Some(bucket) {
                    continue;
                }
                self.last_bucket = Some(bucket);
            }

            if self.json {
                println!("{}", serde_json::to_string(notice).unwrap_or_default());
                continue;
            }

            let line = notice.to_string();
            match notice {
                Notice::ModeElevated => println!("  {}", line.red().bold()),
                Notice::TransitionFinished => println!("  {}", line.dimmed()),
                Notice::Progress { .. } => println!("  {}", line.yellow()),
                Notice::VerificationFailed => println!("  {}", format!("⚠ {}", line).red().bold()),
                Notice::Countdown { .. } => println!("  {}", line.red()),
                Notice::RestartRequested => {
                    self.last_bucket = None;
                    println!();
                    println!("  {}", format!("⟲ {}", line).magenta().bold());
                    println!();
                }
            }
        }
    }
}
