mod cli;
mod logging;

use std::io::{self, Write};

use anyhow::Context;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, FileArgs};
use colored::*;
use dotenv::dotenv;
use org_chart::engine::{ChartRequest, OrgChartEngine};
use org_chart::{tools, AppConfig};
use tracing::info;

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config =
        org_chart::config::load_configuration().context("Error loading configuration")?;

    let args = Cli::parse();

    match args.command {
        Some(Commands::BuildChart { file, filter }) => {
            let engine = OrgChartEngine::new(config);
            let request = file_request(&engine, &file).with_filter(filter.as_deref());
            run_build_chart(&engine, request, file.yes)?;
        }
        Some(Commands::ListGroups { file }) => {
            let engine = OrgChartEngine::new(config);
            let request = file_request(&engine, &file);
            run_list_groups(&engine, request, file.yes)?;
        }
        Some(Commands::ListFiles) => {
            let engine = OrgChartEngine::new(config);
            let candidates = engine.candidates()?;
            info!(
                "{} candidate files in {}",
                candidates.len(),
                engine.config().data_dir.display()
            );
            for name in candidates {
                println!("{}", name);
            }
        }
        Some(Commands::PrintConfig) => {
            print_config(&config)?;
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn file_request(engine: &OrgChartEngine, file: &FileArgs) -> ChartRequest {
    let session = file
        .session
        .as_deref()
        .unwrap_or(&engine.config().default_session);
    ChartRequest::new(file.file.as_deref(), session).with_proceed(file.proceed.as_deref())
}

fn run_build_chart(
    engine: &OrgChartEngine,
    request: ChartRequest,
    assume_yes: bool,
) -> anyhow::Result<()> {
    let mut result = engine.build_chart(&request);

    if let Ok(outcome) = &result {
        if outcome.needs_confirmation() {
            println!("{}", outcome.to_string().yellow());
            if assume_yes || prompt_confirm("Proceed?", Some(false))? {
                result = engine.build_chart(&request.clone().with_proceed(Some("yes")));
            } else {
                return Ok(());
            }
        }
    }

    match result {
        Ok(outcome) => println!("{}", outcome.to_string().green()),
        Err(err) => println!(
            "{}",
            tools::error_message(err, "Error generating organization chart", &request).red()
        ),
    }
    Ok(())
}

fn run_list_groups(
    engine: &OrgChartEngine,
    request: ChartRequest,
    assume_yes: bool,
) -> anyhow::Result<()> {
    let mut result = engine.list_groups(&request);

    if let Ok(outcome) = &result {
        if outcome.needs_confirmation() {
            println!("{}", outcome.to_string().yellow());
            if assume_yes || prompt_confirm("Proceed?", Some(false))? {
                result = engine.list_groups(&request.clone().with_proceed(Some("yes")));
            } else {
                return Ok(());
            }
        }
    }

    match result {
        Ok(outcome) => println!("{}", outcome),
        Err(err) => println!(
            "{}",
            tools::error_message(err, "Error listing groups", &request).red()
        ),
    }
    Ok(())
}

fn print_config(config: &AppConfig) -> anyhow::Result<()> {
    println!("Configuration:");
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" | "YES" => return Ok(true),
            "N" | "NO" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
