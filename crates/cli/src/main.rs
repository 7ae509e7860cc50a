use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{ItemId, RatingIndex, UserId};
use rand::seq::IndexedRandom;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;
use uu_scorer::{Neighborhood, Prediction, RatingVector, ScoreRequest, ScorerConfig, UserUserScorer};

/// uu-recs - User-user collaborative filtering scorer
#[derive(Parser)]
#[command(name = "uu-recs")]
#[command(about = "Predict ratings with mean-centered user-user collaborative filtering", long_about = None)]
struct Cli {
    /// Path to a ratings file (.csv or .dat)
    #[arg(short, long, default_value = "data/ratings.csv")]
    ratings: PathBuf,

    /// Maximum number of neighbors per item
    #[arg(long, default_value = "30")]
    neighborhood_size: usize,

    /// Fewest neighbors an item needs to be scored
    #[arg(long, default_value = "3")]
    min_neighbors: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict a user's ratings for some items
    Score {
        /// User ID to score for
        #[arg(long)]
        user_id: UserId,

        /// Comma-separated item IDs
        #[arg(long, value_delimiter = ',', required = true)]
        items: Vec<ItemId>,

        /// Show the neighborhood behind each prediction
        #[arg(long)]
        explain: bool,

        /// Print predictions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the ranked neighborhood of a user for one item
    Neighbors {
        #[arg(long)]
        user_id: UserId,

        #[arg(long)]
        item_id: ItemId,
    },

    /// Show a user's rating history
    User {
        #[arg(long)]
        user_id: UserId,
    },

    /// Score random users to measure performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Items scored per request
        #[arg(long, default_value = "10")]
        items_per_request: usize,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let start = Instant::now();
    let index = Arc::new(
        RatingIndex::load_from_file(&cli.ratings)
            .with_context(|| format!("Failed to load ratings from {}", cli.ratings.display()))?,
    );
    info!("Loaded ratings in {:?}", start.elapsed());

    let config = ScorerConfig::default()
        .with_neighborhood_size(cli.neighborhood_size)
        .with_min_neighbors(cli.min_neighbors);
    let scorer = UserUserScorer::new(Arc::clone(&index)).with_config(config);

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Score {
            user_id,
            items,
            explain,
            json,
        } => handle_score(&scorer, user_id, &items, explain, json)?,
        Commands::Neighbors { user_id, item_id } => handle_neighbors(&scorer, user_id, item_id)?,
        Commands::User { user_id } => handle_user(&index, user_id)?,
        Commands::Benchmark {
            requests,
            items_per_request,
        } => handle_benchmark(&scorer, &index, requests, items_per_request)?,
    }

    Ok(())
}

/// Handle the 'score' command
fn handle_score(
    scorer: &UserUserScorer<RatingIndex>,
    user_id: UserId,
    items: &[ItemId],
    explain: bool,
    json: bool,
) -> Result<()> {
    let predictions = scorer.score_with_details(user_id, items)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&predictions)?);
        return Ok(());
    }

    print_predictions(user_id, items.len(), &predictions, explain);
    Ok(())
}

/// Handle the 'neighbors' command
fn handle_neighbors(scorer: &UserUserScorer<RatingIndex>, user_id: UserId, item_id: ItemId) -> Result<()> {
    let neighborhood = scorer.neighborhood_for(user_id, item_id)?;

    println!(
        "{}",
        format!("Neighbors of user {} for item {}:", user_id, item_id).bold().blue()
    );
    if neighborhood.is_empty() {
        println!("  (no positively similar raters)");
        return Ok(());
    }
    print_neighborhood(&neighborhood);

    let min = scorer.config().min_neighbors;
    if neighborhood.len() < min {
        println!(
            "{} {} neighbors is below the minimum of {}; this item would not be scored",
            "!".yellow(),
            neighborhood.len(),
            min
        );
    }
    Ok(())
}

/// Handle the 'user' command
fn handle_user(index: &RatingIndex, user_id: UserId) -> Result<()> {
    let vector = RatingVector::from_ratings(index.user_ratings(user_id));
    let Some(mean) = vector.mean() else {
        bail!("User {} has no ratings", user_id);
    };

    println!("{}", format!("User ID: {}", user_id).bold().blue());
    println!("{}Number of ratings: {}", "• ".cyan(), vector.len());
    println!("{}Average rating: {:.2}", "• ".cyan(), mean);

    println!("Top rated items:");
    for (item_id, value) in top_rated(&vector).into_iter().take(10) {
        println!("  - item {} (Rating: {})", item_id, value);
    }
    Ok(())
}

/// Entries by descending rating, ties by ascending item
fn top_rated(vector: &RatingVector) -> Vec<(ItemId, f64)> {
    let mut entries: Vec<_> = vector.iter().collect();
    entries.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    entries
}

/// Handle the 'benchmark' command
fn handle_benchmark(
    scorer: &UserUserScorer<RatingIndex>,
    index: &RatingIndex,
    requests: usize,
    items_per_request: usize,
) -> Result<()> {
    let user_ids = index.user_ids();
    let item_ids = index.item_ids();
    if requests == 0 || user_ids.is_empty() || item_ids.is_empty() {
        bail!("Benchmark needs at least one request, user and item");
    }

    let mut rng = rand::rng();
    let batch: Vec<ScoreRequest> = (0..requests)
        .filter_map(|_| {
            let user_id = *user_ids.choose(&mut rng)?;
            let items = item_ids
                .choose_multiple(&mut rng, items_per_request)
                .copied()
                .collect();
            Some(ScoreRequest::new(user_id, items))
        })
        .collect();

    // Sequential pass for per-request latency
    let mut timings: Vec<Duration> = Vec::with_capacity(batch.len());
    let mut scored = 0;
    for request in &batch {
        let start = Instant::now();
        scored += scorer.score(request.user_id, &request.items)?.len();
        timings.push(start.elapsed());
    }

    // Parallel pass for throughput
    let start = Instant::now();
    let results = scorer.score_batch(&batch);
    let parallel_time = start.elapsed();
    for result in results {
        result?;
    }

    let total_time: Duration = timings.iter().sum();
    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let p50 = timings[timings.len() / 2];
    let p95 = timings[(timings.len() as f32 * 0.95) as usize];
    let p99 = timings[(timings.len() as f32 * 0.99) as usize];
    let throughput = batch.len() as f32 / parallel_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} items each, {} predictions)", batch.len(), items_per_request, scored);
    println!("Sequential total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", p50);
    println!("P95 latency: {:?}", p95);
    println!("P99 latency: {:?}", p99);
    println!("Parallel batch time: {:?}", parallel_time);
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print predictions
fn print_predictions(user_id: UserId, requested: usize, predictions: &[Prediction], explain: bool) {
    println!(
        "{}",
        format!("Predictions for user {} ({} of {} items):", user_id, predictions.len(), requested)
            .bold()
            .blue()
    );
    for prediction in predictions {
        println!(
            "{} item {} - Score: {:.3} ({} neighbors)",
            "•".green(),
            prediction.item_id,
            prediction.score,
            prediction.neighbor_count()
        );
        if explain {
            print_neighborhood(&prediction.neighborhood);
        }
    }
}

fn print_neighborhood(neighborhood: &Neighborhood) {
    for (rank, neighbor) in neighborhood.iter().enumerate() {
        println!(
            "   {}. user {} (similarity {:.4})",
            (rank + 1).to_string().green(),
            neighbor.user_id,
            neighbor.similarity
        );
    }
}
