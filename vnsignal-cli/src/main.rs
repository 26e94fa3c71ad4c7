//! VNSignal CLI — backtest, comparison and watchlist commands.
//!
//! Commands:
//! - `backtest` — run one backtest from a TOML config file or a symbol + dates
//! - `compare` — batch a symbol list (default VN30) over 5Y/1Y windows
//! - `recommend` — print one signal line per symbol or per channel watchlist
//! - `watch add|remove|list` — edit the channel watchlists on disk

use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use vnsignal_core::indicators::IndicatorParams;
use vnsignal_core::signal::RuleConfig;
use vnsignal_runner::{
    generate_comparison, recommendation_for, run_batch, run_from_file, run_symbol,
    save_artifacts, BacktestReport, ChannelId, CsvHistory, HistoryError, HistoryProvider,
    RunConfig, SyntheticHistory, WatchState, Window, VN30_SYMBOLS,
};

#[derive(Parser)]
#[command(
    name = "vnsignal",
    about = "VNSignal CLI — signal backtesting for Vietnamese equities"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one backtest from a TOML config file or a symbol plus dates.
    Backtest {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Symbol to backtest (required without --config), e.g. FPT.
        #[arg(long)]
        symbol: Option<String>,

        /// Start date (YYYY-MM-DD). Defaults to 5 years before the end date.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Signal rule: macd_cross, triple_confirm, stoch_zone.
        #[arg(long, default_value = "triple_confirm")]
        rule: String,

        /// Directory of {SYMBOL}.csv history files.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Use deterministic synthetic history instead of CSV files.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Output directory for the artifact bundle.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Backtest a symbol list over 5-year and 1-year windows and tabulate.
    Compare {
        /// Symbols to compare. Defaults to the VN30 constituents.
        symbols: Vec<String>,

        /// End date of both windows (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Signal rule: macd_cross, triple_confirm, stoch_zone.
        #[arg(long, default_value = "triple_confirm")]
        rule: String,

        /// Directory of {SYMBOL}.csv history files.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Use deterministic synthetic history instead of CSV files.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// File to write the markdown comparison table to.
        #[arg(long, default_value = "comparison.md")]
        output: PathBuf,
    },
    /// Print one recommendation line per symbol.
    Recommend {
        /// Symbols to evaluate. Omit to use a channel watchlist.
        symbols: Vec<String>,

        /// Channel whose watchlist to evaluate (with no symbols given).
        #[arg(long)]
        channel: Option<ChannelId>,

        /// Watch state file.
        #[arg(long, default_value = "watch_state.json")]
        state: PathBuf,

        /// Evaluation date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        as_of: Option<String>,

        /// Signal rule: macd_cross, triple_confirm, stoch_zone.
        #[arg(long, default_value = "triple_confirm")]
        rule: String,

        /// Directory of {SYMBOL}.csv history files.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Use deterministic synthetic history instead of CSV files.
        #[arg(long, default_value_t = false)]
        synthetic: bool,
    },
    /// Watchlist management commands.
    Watch {
        #[command(subcommand)]
        action: WatchAction,
    },
}

#[derive(Subcommand)]
enum WatchAction {
    /// Add symbols to a channel's watchlist.
    Add {
        /// Channel identifier.
        #[arg(long)]
        channel: ChannelId,

        /// Symbols to add.
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Watch state file.
        #[arg(long, default_value = "watch_state.json")]
        state: PathBuf,
    },
    /// Remove symbols from a channel's watchlist.
    Remove {
        /// Channel identifier.
        #[arg(long)]
        channel: ChannelId,

        /// Symbols to remove.
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Watch state file.
        #[arg(long, default_value = "watch_state.json")]
        state: PathBuf,
    },
    /// List watched symbols, for one channel or all.
    List {
        /// Channel identifier. Omit to list every channel.
        #[arg(long)]
        channel: Option<ChannelId>,

        /// Watch state file.
        #[arg(long, default_value = "watch_state.json")]
        state: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Backtest {
            config,
            symbol,
            start,
            end,
            rule,
            data_dir,
            synthetic,
            output_dir,
        } => run_backtest_cmd(
            config, symbol, start, end, rule, data_dir, synthetic, output_dir,
        ),
        Commands::Compare {
            symbols,
            end,
            rule,
            data_dir,
            synthetic,
            output,
        } => run_compare_cmd(symbols, end, rule, data_dir, synthetic, output),
        Commands::Recommend {
            symbols,
            channel,
            state,
            as_of,
            rule,
            data_dir,
            synthetic,
        } => run_recommend_cmd(symbols, channel, state, as_of, rule, data_dir, synthetic),
        Commands::Watch { action } => match action {
            WatchAction::Add {
                channel,
                symbols,
                state,
            } => run_watch_add(channel, &symbols, &state),
            WatchAction::Remove {
                channel,
                symbols,
                state,
            } => run_watch_remove(channel, &symbols, &state),
            WatchAction::List { channel, state } => run_watch_list(channel, &state),
        },
    }
}

/// Install the fmt subscriber, filtered by `VNSIGNAL_LOG` (default `warn`).
fn init_tracing() -> Result<()> {
    let filter = std::env::var("VNSIGNAL_LOG").unwrap_or_else(|_| "warn".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&filter)
        .map_err(|err| anyhow!("invalid VNSIGNAL_LOG filter '{filter}': {err}"))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

fn parse_date(value: Option<&str>, default: NaiveDate) -> Result<NaiveDate> {
    Ok(value
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()?
        .unwrap_or(default))
}

fn build_rule(name: &str) -> Result<RuleConfig> {
    Ok(match name {
        "macd_cross" => RuleConfig::MacdCross,
        "triple_confirm" => RuleConfig::TripleConfirm,
        "stoch_zone" => RuleConfig::StochasticZone {
            oversold: 20.0,
            overbought: 80.0,
        },
        _ => bail!("unknown rule '{name}'. Valid: macd_cross, triple_confirm, stoch_zone"),
    })
}

fn build_provider(data_dir: &Path, synthetic: bool) -> Box<dyn HistoryProvider> {
    if synthetic {
        Box::new(SyntheticHistory::new())
    } else {
        Box::new(CsvHistory::new(data_dir))
    }
}

#[allow(clippy::too_many_arguments)]
fn run_backtest_cmd(
    config_path: Option<PathBuf>,
    symbol: Option<String>,
    start: Option<String>,
    end: Option<String>,
    rule: String,
    data_dir: PathBuf,
    synthetic: bool,
    output_dir: PathBuf,
) -> Result<()> {
    // Validate mutually exclusive options
    if config_path.is_some() && symbol.is_some() {
        bail!("--config and --symbol are mutually exclusive");
    }
    if config_path.is_none() && symbol.is_none() {
        bail!("one of --config or --symbol is required");
    }

    let provider = build_provider(&data_dir, synthetic);

    let report = if let Some(path) = config_path {
        run_from_file(&path, provider.as_ref())?
    } else {
        let symbol = symbol.unwrap().to_uppercase();
        let end_date = parse_date(end.as_deref(), chrono::Local::now().date_naive())?;
        let start_date = parse_date(
            start.as_deref(),
            end_date - chrono::Duration::days(365 * 5),
        )?;
        let mut config = RunConfig::new(symbol, start_date, end_date);
        config.rule = build_rule(&rule)?;
        run_symbol(&config, provider.as_ref())?
    };

    print_summary(&report);

    // Save full artifact set (manifest.json, trades.csv, equity.csv, report.md)
    let run_dir = save_artifacts(&report, &output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());

    Ok(())
}

fn run_compare_cmd(
    symbols: Vec<String>,
    end: Option<String>,
    rule: String,
    data_dir: PathBuf,
    synthetic: bool,
    output: PathBuf,
) -> Result<()> {
    let end_date = parse_date(end.as_deref(), chrono::Local::now().date_naive())?;
    let windows = Window::five_and_one_year(end_date);

    let symbols: Vec<String> = if symbols.is_empty() {
        VN30_SYMBOLS.iter().map(|s| s.to_string()).collect()
    } else {
        symbols.iter().map(|s| s.to_uppercase()).collect()
    };

    let mut base = RunConfig::new("VN30", windows[0].start, end_date);
    base.rule = build_rule(&rule)?;

    let provider = build_provider(&data_dir, synthetic);
    let batch = run_batch(&symbols, &windows, &base, provider.as_ref());

    for failure in &batch.failures {
        eprintln!(
            "Error for {} ({}): {}",
            failure.symbol, failure.window, failure.error
        );
    }
    if batch.rows.is_empty() {
        bail!("every backtest in the batch failed");
    }

    println!(
        "Compared {} runs across {} symbols ({} failed).",
        batch.rows.len(),
        symbols.len(),
        batch.failures.len()
    );

    std::fs::write(&output, generate_comparison(&batch))?;
    println!("Comparison table written to: {}", output.display());

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_recommend_cmd(
    symbols: Vec<String>,
    channel: Option<ChannelId>,
    state_path: PathBuf,
    as_of: Option<String>,
    rule: String,
    data_dir: PathBuf,
    synthetic: bool,
) -> Result<()> {
    let symbols = if symbols.is_empty() {
        let Some(channel) = channel else {
            bail!("pass symbols, or --channel to use a saved watchlist");
        };
        let state = WatchState::load(&state_path)?;
        let watchlist = state.watchlist(channel);
        if watchlist.is_empty() {
            bail!("channel {channel} has an empty watchlist");
        }
        watchlist
    } else {
        symbols
    };

    let as_of = parse_date(as_of.as_deref(), chrono::Local::now().date_naive())?;
    let rule = build_rule(&rule)?.build();
    let params = IndicatorParams::default();
    let provider = build_provider(&data_dir, synthetic);

    let mut failed = 0usize;
    for symbol in &symbols {
        let symbol = symbol.to_uppercase();
        match recommendation_for(provider.as_ref(), &symbol, rule.as_ref(), &params, as_of) {
            Ok(line) => println!("{line}"),
            Err(HistoryError::NoData { .. }) => println!("{symbol}: no data available"),
            Err(err) => {
                eprintln!("Error for {symbol}: {err}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn run_watch_add(channel: ChannelId, symbols: &[String], state_path: &Path) -> Result<()> {
    let mut state = WatchState::load(state_path)?;
    for symbol in symbols {
        let symbol = symbol.to_uppercase();
        if state.add(channel, &symbol) {
            println!("Added {symbol} to channel {channel}.");
        } else {
            println!("{symbol} is already watched by channel {channel}.");
        }
    }
    state.save(state_path)?;
    Ok(())
}

fn run_watch_remove(channel: ChannelId, symbols: &[String], state_path: &Path) -> Result<()> {
    let mut state = WatchState::load(state_path)?;
    for symbol in symbols {
        let symbol = symbol.to_uppercase();
        if state.remove(channel, &symbol) {
            println!("Removed {symbol} from channel {channel}.");
        } else {
            println!("{symbol} was not watched by channel {channel}.");
        }
    }
    state.save(state_path)?;
    Ok(())
}

fn run_watch_list(channel: Option<ChannelId>, state_path: &Path) -> Result<()> {
    let state = WatchState::load(state_path)?;

    match channel {
        Some(channel) => {
            let watchlist = state.watchlist(channel);
            if watchlist.is_empty() {
                println!("Channel {channel} watches nothing.");
            } else {
                println!("Channel {channel}: {}", watchlist.join(" "));
            }
        }
        None => {
            if state.channels.is_empty() {
                println!("No watchlists saved.");
                return Ok(());
            }
            for (channel, watch) in &state.channels {
                let symbols: Vec<&str> = watch.watchlist.iter().map(|s| s.as_str()).collect();
                println!("Channel {channel}: {}", symbols.join(" "));
            }
        }
    }

    Ok(())
}

fn print_summary(report: &BacktestReport) {
    println!();
    println!("=== Backtest Result ===");
    println!("Symbol:            {}", report.config.symbol);
    println!(
        "Period:            {} to {}",
        report.first_session, report.last_session
    );
    println!("Bars:              {}", report.bar_count);
    println!("Rule:              {}", report.config.rule.build().name());
    println!("Run id:            {}", report.run_id);
    println!();
    println!("{}", report.summary);
    if let Some(pos) = &report.open_position {
        println!();
        println!(
            "Open position:     {} shares @ {:.2} since {}",
            pos.size, pos.entry_price, pos.entry_date
        );
    }
    println!();
}
