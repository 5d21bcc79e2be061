//! AI stock analyst dashboard in the terminal
//!
//! # Usage
//!
//! ```bash
//! export GROQ_API_KEY="gsk-..."
//! export TAVILY_API_KEY="tvly-..."
//!
//! # One run
//! cargo run --bin stock-analyst -- --market india-nse RELIANCE
//!
//! # Interactive
//! cargo run --bin stock-analyst
//! ```

use clap::Parser;
use crew_llm::providers::GroqProvider;
use crew_utils::{LogFormat, init_tracing, load_dotenv};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use stock_analyst::dashboard::console::markets_table;
use stock_analyst::{AnalystConfig, ConsoleView, Dashboard, Market, RunOutcome, ToolActivity};
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "stock-analyst", version, about = "AI stock analyst dashboard")]
struct Args {
    /// Market the symbol is listed on
    #[arg(short, long, value_enum, default_value_t = Market::Usa)]
    market: Market,

    /// Stock symbol; starts the interactive dashboard when omitted
    symbol: Option<String>,

    /// Print the supported markets and exit
    #[arg(long)]
    list_markets: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn print_help() {
    println!(
        "Commands:\n  \
         <symbol>       Analyze a stock on the current market\n  \
         (empty line)   Analyze the market's example ticker\n  \
         /market <key>  Switch market (e.g. /market india-nse)\n  \
         /markets       List markets\n  \
         /help          Show this help\n  \
         /exit          Exit"
    );
}

fn build_dashboard() -> anyhow::Result<Dashboard> {
    let config = AnalystConfig::from_env()?;
    debug!(model = %config.model, api_base = %config.groq_api_base, "Configuration loaded");

    let provider = Arc::new(GroqProvider::with_config(config.groq_config())?);
    Ok(Dashboard::from_config(&config, provider, Arc::new(ToolActivity))?)
}

async fn interactive(dashboard: &Dashboard, mut market: Market) -> anyhow::Result<()> {
    let view = ConsoleView::default();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("AI Stock Analyst. Type /help for commands.\n");

    loop {
        print!("[{market}] symbol ({}): ", market.example());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            println!();
            break;
        }

        let input = input.trim();
        match input.split_once(' ').unwrap_or((input, "")) {
            ("/exit" | "/quit", _) => break,
            ("/help", _) => print_help(),
            ("/markets", _) => println!("{}", markets_table()),
            ("/market", key) => match Market::parse(key) {
                Some(selected) => {
                    market = selected;
                    println!("Market set to {market}");
                }
                None => println!("Unknown market '{}'. Try /markets.", key.trim()),
            },
            ("", _) => {
                dashboard.run(market, market.example(), &view).await;
            }
            (command, _) if command.starts_with('/') => {
                println!("Unknown command '{command}'. Type /help for commands.");
            }
            _ => {
                dashboard.run(market, input, &view).await;
            }
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let dotenv = load_dotenv();
    let args = Args::parse();

    let format = if args.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    init_tracing("warn", format);
    if let Some(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }

    if args.list_markets {
        println!("{}", markets_table());
        return Ok(ExitCode::SUCCESS);
    }

    let dashboard = match build_dashboard() {
        Ok(dashboard) => dashboard,
        Err(e) => {
            eprintln!("Error connecting to LLM: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    match args.symbol {
        Some(symbol) => {
            let outcome = dashboard
                .run(args.market, &symbol, &ConsoleView::default())
                .await;
            Ok(match outcome {
                RunOutcome::Completed(_) => ExitCode::SUCCESS,
                RunOutcome::InvalidInput | RunOutcome::NotFound | RunOutcome::Failed(_) => {
                    ExitCode::FAILURE
                }
            })
        }
        None => {
            interactive(&dashboard, args.market).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
