//! eventlog-demo - runs the demo programs against the eventlog facade.
//!
//! ```text
//! eventlog-demo [--level <directives>] [--log-dir <dir>] [--tracing] <demo>
//! ```

mod demos;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::info;

use demos::auth::AuthService;
use demos::calculator::Calculator;
use demos::student::Student;
use demos::{context, levels};
use error::CliError;
use eventlog::LogManager;
use runner::{DemoRunner, RunnerOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Demo {
    /// Every demo in sequence
    All,
    /// Arithmetic operations
    Calculator,
    /// Student grades and average
    Student,
    /// Login and registration with categories
    Auth,
    /// One message per severity
    Levels,
    /// Request tags across concurrent requests
    Context,
}

#[derive(Parser)]
#[command(name = "eventlog-demo")]
#[command(version = eventlog::VERSION)]
#[command(about = "Run the eventlog demo programs", long_about = None)]
struct Args {
    /// Level directives, e.g. "info,calculator=debug" (default: EVENTLOG_LEVEL or info)
    #[arg(long)]
    level: Option<String>,

    /// Base directory for log files
    #[arg(long, default_value = ".")]
    log_dir: PathBuf,

    /// Send terminal output through a tracing subscriber instead of the console sink
    #[arg(long)]
    tracing: bool,

    /// Demo to run
    #[arg(value_enum, default_value = "all")]
    demo: Demo,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let options = RunnerOptions {
        level: args.level,
        log_dir: args.log_dir,
        tracing: args.tracing,
    };
    let runner = DemoRunner::new(&options).unwrap_or_else(|e| e.exit());

    let result = run_demo(runner.manager(), args.demo).await;
    runner.finish();

    if let Err(e) = result {
        e.exit();
    }

    println!();
    println!("Log files are under {}:", options.log_dir.display());
    println!("- logsCalculadora/ for calculator logs");
    println!("- logsEstudiantes/ for student logs");
    println!("- logs/ for the application and audit logs");
}

async fn run_demo(manager: &LogManager, demo: Demo) -> Result<(), CliError> {
    info!(?demo, "Running demo");
    let all = demo == Demo::All;

    if all || demo == Demo::Levels {
        println!("\n--- Log levels ---");
        levels::run(manager);
    }

    if all || demo == Demo::Calculator {
        println!("\n--- Calculator ---");
        let main_log = manager.logger("main");
        main_log.info("Starting calculator module", &[]);
        Calculator::new(manager)
            .run_operations()
            .map_err(demos::DemoError::from)?;
        main_log.info("Calculator module finished", &[]);
    }

    if all || demo == Demo::Student {
        println!("\n--- Student ---");
        let main_log = manager.logger("main");
        main_log.info("Starting student module", &[]);
        Student::new(manager, "Juan Pérez", 20)
            .run_activities()
            .map_err(demos::DemoError::from)?;
        main_log.info("Student module finished", &[]);
    }

    if all || demo == Demo::Context {
        println!("\n--- Context tags ---");
        if let Err(e) = context::run(manager, context::demo_requests()).await {
            manager
                .logger("main")
                .error("Request task failed: {}", &[&e]);
        }
    }

    if all || demo == Demo::Auth {
        println!("\n--- Authentication ---");
        let auth = AuthService::new(manager);
        println!("Successful login: {}", auth.login("admin@example.com", "admin123"));
        println!("Failed login: {}", auth.login("user@example.com", "password"));
        println!("Login with empty email: {}", auth.login("", "password"));

        auth.register("new@example.com", "New User")
            .map_err(demos::DemoError::from)?;
        if let Err(e) = auth.register("invalid-email", "Invalid User") {
            println!("Registration rejected: {}", e);
        }
    }

    Ok(())
}
