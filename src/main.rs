use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::{Context, bail};
use chartscrape::{RunSummary, ScrapingContext, Selection};
use log::{LevelFilter, error};

/// What the user asked to scrape.
enum Request {
    All,
    One(Selection),
}

fn prompt(
    question: &str,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> anyhow::Result<String> {
    println!("{question}");
    io::stdout().flush()?;
    let answer = lines.next().context("no input given")??;
    Ok(answer.trim().to_lowercase())
}

fn ask_for_request() -> anyhow::Result<Request> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let decision = prompt(
        "Would you like to gather all monkey ball data (a), or just one particular section? (s)",
        &mut lines,
    )?;
    match decision.as_str() {
        "a" => Ok(Request::All),
        "s" => {
            let game = prompt(
                "Select a game (1 for SMB1, 2 for SMB2, p for SMB2 PAL, d for SMBDX):",
                &mut lines,
            )?;
            let mode = prompt("Time or score (t for Time, s for Score):", &mut lines)?;
            Ok(Request::One(Selection::from_letters(&game, &mode)?))
        }
        other => bail!("invalid choice {other:?}, expected a or s"),
    }
}

fn request_from_args(args: &[String]) -> anyhow::Result<Option<Request>> {
    match args {
        [] => Ok(None),
        [all] if all == "all" => Ok(Some(Request::All)),
        [game, mode] => Ok(Some(Request::One(Selection::from_letters(game, mode)?))),
        _ => bail!("usage: chartscrape [all | <game 1|2|p|d> <mode s|t>]"),
    }
}

fn print_summary(selection: Selection, summary: &RunSummary) {
    println!(
        "{selection}: {} charts written ({} records), {} excluded, {} failed, {} records dropped",
        summary.charts_written.len(),
        summary.records_written(),
        summary.charts_excluded,
        summary.charts_failed.len(),
        summary.records_dropped(),
    );
    for (chart_id, reason) in &summary.charts_failed {
        println!("  chart {chart_id}: {reason}");
    }
}

async fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let request = match request_from_args(&args)? {
        Some(request) => request,
        None => ask_for_request()?,
    };

    let context = ScrapingContext::new()?;
    let orchestrator = context.orchestrator();

    match request {
        Request::All => {
            orchestrator.run_all(print_summary).await?;
            println!("\nData collection complete!");
        }
        Request::One(selection) => {
            println!("\nBeginning data collection for {selection}...\n");
            let summary = orchestrator.run(selection).await?;
            print_summary(selection, &summary);
            println!("\nData collection of {selection} complete!");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("{e:#}\nPlease restart and try again.");
            ExitCode::FAILURE
        }
    }
}
