use anyhow::{Context, Result};
use chrono::Utc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tt_predict::config::Config;
use tt_predict::diagnostic::build_board_rows;
use tt_predict::engine::filter::{filter_matches, MatchFilters};
use tt_predict::engine::stats::{aggregate_period, Period, Statistics};
use tt_predict::engine::types::{BetTier, Score};
use tt_predict::engine::Predictor;
use tt_predict::feed::{self, MatchFeed};
use tt_predict::pipeline::{build_board, MatchBoard};
use tt_predict::store::{
    JsonFileRepository, JsonHistoryRepository, ManualBook, ManualStatus, NewManualMatch,
    PredictionHistory,
};

const USAGE: &str = "\
usage: tt-predict [--once] [--offline] [--league NAME] [--min-confidence N] [--tier TIER]
       tt-predict add <player1> <player2> [--league NAME] [--live P1:P2]
       tt-predict score <id> <P1:P2>
       tt-predict delete <id>
       tt-predict clear
       tt-predict list
       tt-predict stats [all|today|week|month]";

enum Command {
    Run {
        once: bool,
        offline: bool,
        filters: MatchFilters,
    },
    Add(NewManualMatch),
    Score(String, Score),
    Delete(String),
    Clear,
    List,
    Stats(Option<Period>),
}

fn parse_score(raw: &str) -> Result<Score> {
    let (a, b) = raw
        .split_once(':')
        .with_context(|| format!("score must look like 2:1, got {raw:?}"))?;
    Ok(Score::new(
        a.trim().parse().with_context(|| format!("bad score {raw:?}"))?,
        b.trim().parse().with_context(|| format!("bad score {raw:?}"))?,
    ))
}

fn parse_tier(raw: &str) -> Result<BetTier> {
    Ok(match raw.to_lowercase().as_str() {
        "strong" => BetTier::Strong,
        "medium" => BetTier::Medium,
        "risky" => BetTier::Risky,
        "skip" => BetTier::Skip,
        other => anyhow::bail!("unknown tier {other:?}"),
    })
}

fn parse_run_flags(args: &[String]) -> Result<Command> {
    let mut once = false;
    let mut offline = false;
    let mut filters = MatchFilters::default();
    let mut it = args.iter();
    while let Some(flag) = it.next() {
        match flag.as_str() {
            "--once" => once = true,
            "--offline" => offline = true,
            "--league" => filters.league = Some(it.next().context("--league needs a value")?.clone()),
            "--min-confidence" => {
                let raw = it.next().context("--min-confidence needs a value")?;
                filters.min_confidence = Some(
                    raw.parse()
                        .with_context(|| format!("bad confidence {raw:?}"))?,
                );
            }
            "--tier" => filters.bet_tier = Some(parse_tier(it.next().context("--tier needs a value")?)?),
            other => anyhow::bail!("unknown option {other}\n{USAGE}"),
        }
    }
    Ok(Command::Run {
        once,
        offline,
        filters,
    })
}

fn parse_args(args: &[String]) -> Result<Command> {
    let Some(first) = args.first() else {
        return parse_run_flags(args);
    };
    match first.as_str() {
        "add" => {
            let (Some(player1), Some(player2)) = (args.get(1), args.get(2)) else {
                anyhow::bail!("add needs two player names\n{USAGE}");
            };
            let mut league = "Liga Pro Russia".to_string();
            let mut status = ManualStatus::Upcoming;
            let mut score = None;
            let mut rest = args[3..].iter();
            while let Some(flag) = rest.next() {
                match flag.as_str() {
                    "--league" => {
                        league = rest.next().context("--league needs a value")?.clone();
                    }
                    "--live" => {
                        status = ManualStatus::Live;
                        score = Some(parse_score(rest.next().context("--live needs a score")?)?);
                    }
                    other => anyhow::bail!("unknown add option {other}\n{USAGE}"),
                }
            }
            Ok(Command::Add(NewManualMatch {
                player1: player1.clone(),
                player2: player2.clone(),
                league,
                status,
                score,
            }))
        }
        "score" => {
            let (Some(id), Some(raw)) = (args.get(1), args.get(2)) else {
                anyhow::bail!("score needs an id and a score\n{USAGE}");
            };
            Ok(Command::Score(id.clone(), parse_score(raw)?))
        }
        "delete" => Ok(Command::Delete(
            args.get(1).context("delete needs an id")?.clone(),
        )),
        "clear" => Ok(Command::Clear),
        "list" => Ok(Command::List),
        "stats" => match args.get(1) {
            None => Ok(Command::Stats(None)),
            Some(p) => Period::parse(p)
                .map(|p| Command::Stats(Some(p)))
                .with_context(|| format!("unknown period {p:?}")),
        },
        _ => parse_run_flags(args),
    }
}

fn print_board(board: &MatchBoard, filters: &MatchFilters) {
    println!();
    println!(
        "  {} matches ({} live, {} upcoming, {} top picks) source={} updated={}",
        board.count,
        board.live_count,
        board.upcoming_count,
        board.high_conf_count,
        board.source.as_str(),
        board.updated_at.format("%H:%M:%S")
    );
    let shown: Vec<_> = filter_matches(&board.matches, filters)
        .into_iter()
        .cloned()
        .collect();
    if shown.len() < board.count {
        println!("  showing {} after filters", shown.len());
    }
    for row in build_board_rows(&shown) {
        println!(
            "  {:<16} {:<36} {:<12} {:<12} {:<18} {:>4} {:<6} {:<15} {:>4} {:>5} {}",
            row.league,
            row.matchup,
            row.start_time,
            row.status,
            row.pick,
            row.confidence,
            row.tier,
            row.odds,
            row.implied,
            row.margin,
            row.factors
        );
    }
}

fn print_stats(stats: &Statistics, period: Period) {
    println!();
    println!("  Statistics ({period:?})");
    println!(
        "  total {}  correct {}  incorrect {}  pending {}",
        stats.total, stats.correct, stats.incorrect, stats.pending
    );
    println!(
        "  win rate {:.1}%  streak {}  avg odds {:.2}  roi {:.1}% (signed {:.1}%)",
        stats.win_rate, stats.streak, stats.avg_odds, stats.roi, stats.roi_signed
    );
    let t = &stats.tier_counts;
    println!(
        "  tiers: strong {}  medium {}  risky {}  skip {}",
        t.strong, t.medium, t.risky, t.skip
    );
    for l in &stats.by_league {
        println!("    {:<20} {:>3}/{:<3} {:.1}%", l.league, l.correct, l.total, l.win_rate);
    }
}

/// One board refresh: manual entries plus whatever the feed returns. Every
/// predicted match is recorded into the history.
async fn refresh(
    config: &Config,
    predictor: &Predictor,
    book: &ManualBook<JsonFileRepository>,
    history: &PredictionHistory<JsonHistoryRepository>,
    feed: &mut Option<Box<dyn MatchFeed>>,
) -> Result<MatchBoard> {
    let manual = book.list()?;
    let now = Utc::now();
    let high = config.dashboard.high_confidence;

    let Some(feed) = feed.as_mut() else {
        let board = build_board(&manual, Vec::new(), predictor, &config.odds, high, now);
        record_history(history, &board);
        return Ok(board);
    };

    let fed = match feed.fetch_matches().await {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!(feed = feed.name(), error = %e, "match fetch failed");
            Vec::new()
        }
    };
    let mut board = build_board(&manual, fed, predictor, &config.odds, high, now);

    match feed.fetch_live().await {
        Ok(events) => {
            let changed = board.apply_live_scores(&events, predictor, high);
            tracing::debug!(changed, events = events.len(), "live scores applied");
        }
        Err(e) => tracing::warn!(feed = feed.name(), error = %e, "live score fetch failed"),
    }
    record_history(history, &board);
    Ok(board)
}

fn record_history(history: &PredictionHistory<JsonHistoryRepository>, board: &MatchBoard) {
    match history.record(&board.matches) {
        Ok(outcome) if outcome.saved + outcome.settled > 0 => tracing::info!(
            saved = outcome.saved,
            settled = outcome.settled,
            "predictions recorded"
        ),
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "prediction history update failed"),
    }
}

fn build_feed(config: &Config, offline: bool) -> Result<Option<Box<dyn MatchFeed>>> {
    if offline || !config.feed.enabled {
        return Ok(None);
    }
    feed::from_config(&config.feed, &config.odds).map(Some)
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_file = std::fs::File::create("tt-predict.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tt_predict=info")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    // Load saved settings from .env (real env vars take precedence)
    Config::load_env_file();

    let config = Config::load_or_default(&Config::path_from_env())?;
    let predictor = Predictor::new(config.engine.clone(), config.tiers);
    let book = ManualBook::new(JsonFileRepository::new(&config.store.manual_matches_path));
    let history = PredictionHistory::new(JsonHistoryRepository::new(&config.store.history_path));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (once, offline, filters) = match parse_args(&args)? {
        Command::Add(new) => {
            let entry = book.add(new, Utc::now())?;
            println!("  added {} : {} vs {}", entry.id, entry.player1, entry.player2);
            return Ok(());
        }
        Command::Score(id, score) => {
            if book.set_score(&id, score)? {
                println!("  {id} now {}:{}", score.p1, score.p2);
            } else {
                println!("  no live manual match with id {id}");
            }
            return Ok(());
        }
        Command::Delete(id) => {
            if book.delete(&id)? {
                println!("  deleted {id}");
            } else {
                println!("  no manual match with id {id}");
            }
            return Ok(());
        }
        Command::Clear => {
            book.clear()?;
            println!("  manual matches cleared");
            return Ok(());
        }
        Command::List => {
            for m in book.list()? {
                let score = m.score.map(|s| format!(" ({}:{})", s.p1, s.p2)).unwrap_or_default();
                println!("  {}  {} vs {}  [{}]{}", m.id, m.player1, m.player2, m.league, score);
            }
            return Ok(());
        }
        Command::Stats(period) => {
            let period = period
                .or_else(|| Period::parse(&config.dashboard.stats_period))
                .unwrap_or(Period::All);
            let mut feed = build_feed(&config, false)?;
            refresh(&config, &predictor, &book, &history, &mut feed).await?;
            let stats = aggregate_period(&history.all()?, period, Utc::now());
            print_stats(&stats, period);
            return Ok(());
        }
        Command::Run {
            once,
            offline,
            filters,
        } => (once, offline, filters),
    };

    println!();
    println!("  Table Tennis Prediction Engine v{}", env!("CARGO_PKG_VERSION"));
    println!("  ==================================");
    let tiers = predictor.tiers();
    println!(
        "  Tiers: strong >= {}  medium >= {}  risky >= {}",
        tiers.strong, tiers.medium, tiers.risky
    );
    let mut feed = build_feed(&config, offline)?;
    match &feed {
        Some(f) => println!("  Feed: {}", f.name()),
        None => println!("  Feed disabled: showing manual matches only"),
    }

    let mut interval =
        tokio::time::interval(Duration::from_secs(config.feed.poll_interval_s.max(1)));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match refresh(&config, &predictor, &book, &history, &mut feed).await {
                    Ok(board) => {
                        tracing::info!(
                            count = board.count,
                            live = board.live_count,
                            source = board.source.as_str(),
                            "board refreshed"
                        );
                        print_board(&board, &filters);
                        match history.all() {
                            Ok(records) => {
                                let stats = aggregate_period(&records, Period::All, Utc::now());
                                if stats.total > 0 {
                                    print_stats(&stats, Period::All);
                                }
                            }
                            Err(e) => tracing::warn!(error = %e, "prediction history unreadable"),
                        }
                    }
                    Err(e) => tracing::error!(error = %e, "board refresh failed"),
                }
                if once {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("ctrl-c received");
                break;
            }
        }
    }

    tracing::debug!("shutting down");
    Ok(())
}
