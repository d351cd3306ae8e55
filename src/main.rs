use std::io::{BufRead, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::datasets::{normalize_user_id, RatingsStore};
use crate::error::RecError;
use crate::recommenders::{Recommender, UserBasedRecommender};
use crate::types::Candidate;

mod datasets;
mod error;
mod metrics;
mod recommenders;
mod types;

const PROMPT: &str = "Enter user name (e.g., U1): ";

#[derive(Parser, Debug)]
#[command(name = "user-cf-rec")]
#[command(about = "User-based collaborative filtering over a small ratings table")]
pub struct Args {
    /// User to recommend for (prompted on stdin when omitted)
    #[arg(short, long)]
    pub user: Option<String>,

    /// Ratings CSV with header userId,itemId,rating (built-in sample data when omitted)
    #[arg(short, long)]
    pub ratings: Option<PathBuf>,

    /// Print at most this many recommendations
    #[arg(short = 'n', long)]
    pub limit: Option<NonZeroUsize>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(
        long,
        default_value = "warn",
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    pub log_level: String,
}

fn init_tracing(log_level: &str) {
    let level = match log_level {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::WARN,
    };
    // stdoutは結果表示専用なのでログはstderrへ
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_store(path: Option<&PathBuf>) -> anyhow::Result<RatingsStore> {
    match path {
        Some(path) => RatingsStore::from_path(path)
            .with_context(|| format!("failed to load ratings from {}", path.display())),
        None => Ok(RatingsStore::sample()),
    }
}

/// 空かどうかは切り詰める前の候補で判定する
fn write_recommendations<W: Write>(
    out: &mut W,
    user_id: &str,
    candidates: &[Candidate],
    limit: Option<usize>,
) -> std::io::Result<()> {
    writeln!(out, "\nTop Recommendations for {user_id}:")?;
    if candidates.is_empty() {
        writeln!(out, "No recommendations found.")?;
        return Ok(());
    }
    for candidate in candidates.iter().take(limit.unwrap_or(usize::MAX)) {
        writeln!(out, "Item: {} | Score: {:.2}", candidate.item_id, candidate.score)?;
    }
    Ok(())
}

/// 1回分の問い合わせを処理する
///
/// `user` が None の場合はプロンプトを出して `input` から1行読む。
/// 未知のユーザーはエラーではなく "User not found." を出力して終わる。
pub fn run<R: BufRead, W: Write>(
    store: &RatingsStore,
    user: Option<&str>,
    limit: Option<usize>,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<()> {
    let raw = match user {
        Some(user) => user.to_string(),
        None => {
            write!(out, "{PROMPT}")?;
            out.flush()?;
            let mut line = String::new();
            input.read_line(&mut line).context("failed to read user id")?;
            line
        }
    };
    let user_id = normalize_user_id(&raw);

    let recommender = UserBasedRecommender::new(store);
    let candidates = match recommender.recommend(&user_id) {
        Ok(candidates) => candidates,
        Err(RecError::UserNotFound(user_id)) => {
            tracing::warn!(user = %user_id, "unknown user");
            writeln!(out, "User not found.")?;
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    write_recommendations(out, &user_id, &candidates, limit)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let store = load_store(args.ratings.as_ref())?;
    if store.is_empty() {
        tracing::warn!("ratings store is empty");
    }
    tracing::info!(users = store.len(), "ratings store ready");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run(
        &store,
        args.user.as_deref(),
        args.limit.map(NonZeroUsize::get),
        &mut stdin.lock(),
        &mut stdout.lock(),
    )
}
