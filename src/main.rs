#![cfg(not(tarpaulin_include))]

use clap::Parser;
use log::debug;
use metricalc::{Calculator, CalculatorConfig, Command, HELP, parse_command};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "metricalc")]
#[command(about = "Interactive marketing metric calculator", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON config with seed overrides and undo limit
    #[arg(short, long, env = "METRICALC_CONFIG")]
    config: Option<PathBuf>,

    /// Print the final metric set as JSON on exit
    #[arg(long)]
    json: bool,

    /// Do not print the metric table after each command
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let config = CalculatorConfig::load(cli.config.as_deref())?;
    let mut calc = Calculator::new(&config);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut status = String::from("ok");
    let mut elapsed = 0.0;

    loop {
        if !cli.quiet {
            print!("{}", calc.metrics().render_table());
        }
        print!("[{:.1}] ({}) > ", elapsed, status);
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let start = Instant::now();

        status = match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Edit { metric, text }) => {
                let changed = calc.edit(metric, &text);
                debug!("{} edit changed {:?}", metric, changed);
                format!("ok, {} updated", changed.len())
            }
            Ok(Command::Commit(Some(metric))) => {
                calc.commit(metric);
                String::from("ok")
            }
            Ok(Command::Commit(None)) => {
                calc.commit_all();
                String::from("ok")
            }
            Ok(Command::Undo) => {
                if calc.undo() {
                    String::from("ok")
                } else {
                    String::from("nothing to undo")
                }
            }
            Ok(Command::Reset) => {
                calc.reset();
                String::from("ok")
            }
            Ok(Command::Json) => {
                println!("{}", serde_json::to_string_pretty(calc.metrics())?);
                String::from("ok")
            }
            Ok(Command::Help) => {
                println!("{}", HELP);
                String::from("ok")
            }
            Err(e) => e.to_string(),
        };
        elapsed = start.elapsed().as_secs_f64();
    }

    if cli.json {
        calc.commit_all();
        println!("{}", serde_json::to_string_pretty(calc.metrics())?);
    }

    Ok(())
}
