use fwforge::config;
use fwforge::scenario::{RunReport, ScenarioParams, ScenarioRunner};
use fwforge::ui;
mod cmd;

use std::fs;
use std::process;
use std::time::Duration;

use clap::Parser;

fn main() {
    let args = cmd::Args::parse();
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(args) {
        log::error!("{e}");
        process::exit(1);
    }
}

fn run(args: cmd::Args) -> Result<(), Box<dyn std::error::Error>> {
    let profile = match &args.profile {
        Some(path) => {
            let profile_str = fs::read_to_string(path)?;
            config::import_profile(&profile_str)
        }
        None => config::Profile::default(),
    };

    let target = format!("{}:{}", args.host, args.port);
    let params = |delay: f64, coalesce: bool| -> Result<ScenarioParams, Box<dyn std::error::Error>> {
        Ok(ScenarioParams {
            target: target.clone(),
            src_ip: args.source_ip.clone(),
            format: args.format,
            delay: Duration::try_from_secs_f64(delay)?,
            coalesce,
            verbose: args.verbose,
        })
    };

    let mut runner = ScenarioRunner::new(profile, args.seed);
    let (name, report): (&str, RunReport) = match args.command {
        cmd::Command::FastScan { delay, coalesce } => {
            let params = params(delay, coalesce)?;
            ui::banner("fast scan", &params);
            ("fast scan", runner.fast_scan(&params)?)
        }
        cmd::Command::SlowScan { delay } => {
            let params = params(delay, false)?;
            ui::banner("slow scan", &params);
            ("slow scan", runner.slow_scan(&params)?)
        }
        cmd::Command::Baseline { delay } => {
            let params = params(delay, false)?;
            ui::banner("baseline traffic", &params);
            ("baseline traffic", runner.baseline_traffic(&params)?)
        }
        cmd::Command::AllowTraffic { delay } => {
            let params = params(delay, false)?;
            ui::banner("allow traffic", &params);
            ("allow traffic", runner.allow_traffic(&params)?)
        }
        cmd::Command::All { delay, coalesce } => {
            let params = params(delay, coalesce)?;
            ui::banner("composite run", &params);
            ("composite run", runner.composite(&params)?)
        }
    };

    ui::summary(name, &report);
    Ok(())
}
