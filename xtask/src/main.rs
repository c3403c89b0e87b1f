//! Build automation tasks for the VU clock firmware.
//!
//! Run with: `cargo xtask <command>`

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::process::{Command, ExitCode};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for the VU clock", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: host tests, firmware for both boards, docs
    CheckAll,
    /// Run the host tests (needle logic, DS1307 driver, self test)
    Test,
    /// Build library with specified features
    Build {
        #[arg(long, default_value = "pico1")]
        board: Board,
    },
    /// Build a firmware demo
    Example {
        /// Demo name (vu_clock or meter_sweep)
        #[arg(default_value = "vu_clock")]
        name: String,
        #[arg(long, default_value = "pico1")]
        board: Board,
    },
    /// Build UF2 firmware file for flashing to Pico
    Uf2 {
        /// Demo name (vu_clock or meter_sweep)
        #[arg(default_value = "vu_clock")]
        name: String,
        #[arg(long, default_value = "pico1")]
        board: Board,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Board {
    Pico1,
    Pico2,
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Board::Pico1 => write!(f, "pico1"),
            Board::Pico2 => write!(f, "pico2"),
        }
    }
}

impl Board {
    fn target(self) -> &'static str {
        match self {
            Board::Pico1 => "thumbv6m-none-eabi",
            Board::Pico2 => "thumbv8m.main-none-eabihf",
        }
    }

    fn features(self) -> String {
        format!("{self},arm")
    }
}

const DEMOS: [&str; 2] = ["vu_clock", "meter_sweep"];

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::CheckAll => check_all(),
        Commands::Test => exit_code(run_host_tests()),
        Commands::Build { board } => exit_code(build_lib(board)),
        Commands::Example { name, board } => exit_code(build_example(&name, board)),
        Commands::Uf2 { name, board } => build_uf2(&name, board),
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn check_all() -> ExitCode {
    println!("{}", "==> Running host tests...".cyan());
    if !run_host_tests() {
        return ExitCode::FAILURE;
    }

    for board in [Board::Pico1, Board::Pico2] {
        println!("\n{}", format!("==> Building library ({board})...").cyan());
        if !build_lib(board) {
            return ExitCode::FAILURE;
        }

        println!("\n{}", format!("==> Building demos ({board})...").cyan());
        for demo in DEMOS {
            println!("  {}", format!("- {demo}").bright_black());
            if !build_example(demo, board) {
                return ExitCode::FAILURE;
            }
        }
    }

    println!("\n{}", "==> Building documentation...".cyan());
    let board = Board::Pico1;
    if !run_command(Command::new("cargo").current_dir(workspace_root()).args([
        "doc",
        "--target",
        board.target(),
        "--no-deps",
        "--features",
        &board.features(),
    ])) {
        return ExitCode::FAILURE;
    }

    println!("\n{}", "==> All checks passed!".green().bold());
    ExitCode::SUCCESS
}

fn run_host_tests() -> bool {
    let host_target = host_target();
    match host_target.as_deref() {
        Some(target) => {
            println!(
                "  {}",
                format!("Using host target: {target}").bright_black()
            );
        }
        None => {
            println!(
                "{}",
                "  Unable to detect host target; relying on cargo default.".bright_black()
            );
        }
    }

    let mut test_cmd = Command::new("cargo");
    test_cmd
        .current_dir(workspace_root())
        .args(["test", "--package", "vu-clock"]);

    if let Some(target) = host_target {
        test_cmd.arg("--target").arg(target);
    }

    run_command(&mut test_cmd)
}

fn build_lib(board: Board) -> bool {
    let features = board.features();
    println!(
        "{}",
        format!("Building library with features: {features}").cyan()
    );

    if run_command(Command::new("cargo").current_dir(workspace_root()).args([
        "build",
        "--lib",
        "--target",
        board.target(),
        "--features",
        &features,
    ])) {
        println!("{}", "Build successful!".green());
        true
    } else {
        false
    }
}

fn build_example(name: &str, board: Board) -> bool {
    let features = board.features();
    println!(
        "{}",
        format!("Building demo '{name}' with features: {features}").cyan()
    );

    if run_command(Command::new("cargo").current_dir(workspace_root()).args([
        "build",
        "--example",
        name,
        "--target",
        board.target(),
        "--features",
        &features,
    ])) {
        println!("{}", "Build successful!".green());
        true
    } else {
        false
    }
}

fn build_uf2(name: &str, board: Board) -> ExitCode {
    let target = board.target();
    let features = board.features();

    println!(
        "{}",
        format!("Building UF2 for demo '{name}' ({board})").cyan()
    );
    println!("  Features: {}", features.bright_black());
    println!("  Target: {}", target.bright_black());

    // Build in release mode for UF2
    if !run_command(Command::new("cargo").current_dir(workspace_root()).args([
        "build",
        "--example",
        name,
        "--release",
        "--target",
        target,
        "--features",
        &features,
    ])) {
        return ExitCode::FAILURE;
    }

    let elf_path = format!("target/{target}/release/examples/{name}");
    let uf2_path = format!("{name}.uf2");

    println!("\n{}", "Converting to UF2 format...".cyan());

    if run_command(
        Command::new("elf2uf2-rs")
            .current_dir(workspace_root())
            .args([&elf_path, &uf2_path]),
    ) {
        println!("{}", format!("UF2 created: {uf2_path}").green().bold());
        println!("{}", "Ready to drag-and-drop to your Pico!".bright_black());
        ExitCode::SUCCESS
    } else {
        println!(
            "{}",
            "Note: Install elf2uf2-rs with: cargo install elf2uf2-rs".yellow()
        );
        ExitCode::FAILURE
    }
}

fn workspace_root() -> std::path::PathBuf {
    // `cargo xtask` runs from the workspace root.
    std::env::current_dir().expect("Failed to get current directory")
}

fn host_target() -> Option<String> {
    let output = Command::new("rustc").arg("-vV").output().ok()?;
    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("host: "))
        .map(|host| host.trim().to_string())
}

fn run_command(cmd: &mut Command) -> bool {
    match cmd.status() {
        Ok(status) => status.success(),
        Err(e) => {
            eprintln!("{}", format!("Failed to execute command: {e}").red());
            false
        }
    }
}
