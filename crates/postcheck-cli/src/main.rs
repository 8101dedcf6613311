//! postcheck CLI - scripted CRUD checks against a blog-post API

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use postcheck_core::{Config, StepStatus, report};
use postcheck_runner::ScenarioRunner;

#[derive(Parser)]
#[command(name = "postcheck")]
#[command(about = "Scripted CRUD checks against a blog-post API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the end-to-end scenario
    Run {
        /// Config file (default: .postcheck.toml)
        #[arg(short, long)]
        config: Option<String>,

        /// Write the JSON report to this file
        #[arg(long)]
        report: Option<String>,

        /// Leave the created postings in place (skip the delete step)
        #[arg(long)]
        skip_cleanup: bool,
    },

    /// Initialize config file
    Init,

    /// Export JSON Schema for the report format
    Schema,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Run {
            config,
            report,
            skip_cleanup,
        } => {
            // Load config
            let cfg = if let Some(path) = config {
                Config::load(std::path::Path::new(&path))?
            } else {
                Config::load_default()?
            };

            if cli.output != OutputFormat::Silent {
                eprintln!("Config:");
                eprintln!("  base_url:     {}", cfg.base_url);
                eprintln!("  postings_uri: {}", cfg.postings_uri);
                eprintln!("  fixtures:     {} postings", cfg.postings.len());
                eprintln!();
            }

            let runner = ScenarioRunner::new(cfg).with_skip_cleanup(skip_cleanup);
            let scenario_report = runner.run()?;

            match cli.output {
                OutputFormat::Terminal => {
                    let icon = if scenario_report.has_failures() {
                        "FAIL"
                    } else {
                        "PASS"
                    };
                    println!(
                        "\n{icon}: {} passed, {} failed, {} skipped ({:.2}s)",
                        scenario_report.passed,
                        scenario_report.failed,
                        scenario_report.skipped,
                        scenario_report.duration_secs
                    );
                    for step in &scenario_report.steps {
                        if step.status == StepStatus::Failed {
                            println!(
                                "  FAIL: {} — {}",
                                step.name,
                                step.detail.as_deref().unwrap_or("")
                            );
                        }
                    }
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&scenario_report)?);
                }
                OutputFormat::Silent => {}
            }

            if let Some(path) = report {
                std::fs::write(&path, serde_json::to_string_pretty(&scenario_report)?)?;
                if cli.output != OutputFormat::Silent {
                    eprintln!("Report saved: {path}");
                }
            }

            Ok(scenario_report.exit_code())
        }

        Commands::Init => {
            let config_path = ".postcheck.toml";
            if std::path::Path::new(config_path).exists() {
                eprintln!("{config_path} already exists");
                return Ok(1);
            }

            std::fs::write(config_path, Config::example())?;
            println!("Created {config_path}");
            println!("\nEdit the file to configure:");
            println!("  - base_url: the blog-post API to check");
            println!("  - postings: the fixture postings to create");
            println!("  - admin/user headers: auth cookies, CSRF tokens");
            Ok(0)
        }

        Commands::Schema => {
            let schema = report::generate_schema();
            println!("{schema}");
            Ok(0)
        }
    }
}
