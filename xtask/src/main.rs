use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the reparto workspace",
    long_about = "A unified CLI for running CI checks and the operator\n\
                  flows in the reparto delivery workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks (fmt, clippy, tests)
    Ci,
    /// Print the route sheet from the local data directory
    RouteSheet {
        /// Output file path; omit to print to stdout
        #[arg(long)]
        output: Option<String>,
    },
    /// Export the delivery records from the local data directory as CSV
    ExportCsv {
        /// Output file path
        #[arg(long, default_value = "deliveries.csv")]
        output: String,
    },
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test reparto_core");
    run_cargo(&["test", "-p", "reparto_core"]);

    step("Test reparto_cli");
    run_cargo(&["test", "-p", "reparto_cli"]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci => {
            ci_check();
        }
        Commands::RouteSheet { output } => {
            let mut args = vec!["run", "-p", "reparto_cli", "--", "route-sheet"];
            if let Some(path) = output.as_deref() {
                args.push("--output");
                args.push(path);
            }
            run_cargo(&args);
        }
        Commands::ExportCsv { output } => {
            run_cargo(&[
                "run",
                "-p",
                "reparto_cli",
                "--",
                "export-csv",
                "--output",
                &output,
            ]);
        }
    }
}
