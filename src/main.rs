use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use movie_elo::export::{self, save};
use movie_elo::movie::load_movies;
use movie_elo::{RankedMovie, RankerConfig, Session, Strategy};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Rank movies by picking the better of two, over and over.
#[derive(Parser)]
#[command(name = "movie-elo", version)]
struct Cli {
    /// JSON array of movies: `[{"id": 1, "title": "...", "year": "...", "poster": "..."}]`
    movies: PathBuf,

    /// Config file (JSON). Defaults to $MOVIE_ELO_CONFIG if set
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum)]
    strategy: Option<Strategy>,

    /// Seed for reproducible pair selection
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many comparisons
    #[arg(long)]
    budget: Option<usize>,

    /// Write the ranking as a numbered list
    #[arg(long)]
    text: Option<PathBuf>,

    #[arg(long)]
    csv: Option<PathBuf>,

    #[arg(long)]
    json: Option<PathBuf>,

    /// List the least preferred movie first
    #[arg(long)]
    ascending: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RankerConfig::load(path)
            .wrap_err_with(|| format!("failed to load config {}", path.display()))?,
        None => RankerConfig::from_env()?,
    };
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if cli.budget.is_some() {
        config.budget = cli.budget;
    }

    let movies = load_movies(&cli.movies)
        .wrap_err_with(|| format!("failed to read movies from {}", cli.movies.display()))?;
    println!("Ranking {} movies ({:?})", movies.len(), config.strategy);

    let rng = config.rng();
    let mut session = Session::new(movies, &config, rng)?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    while let Some((first, second)) = session.current_pair() {
        println!();
        println!(
            "[{:>3.0}%] Which do you prefer?",
            session.progress() * 100.0
        );
        println!("  1) {}", first.label());
        println!("  2) {}", second.label());
        print!("1/2 (q to stop): ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let (winner, loser) = match line.trim() {
            "1" => (first.id.clone(), second.id.clone()),
            "2" => (second.id.clone(), first.id.clone()),
            "q" => break,
            other => {
                eprintln!("Please answer 1, 2 or q, not {other:?}");
                continue;
            }
        };
        session.submit_outcome(&winner, &loser)?;
    }

    match session.stop_reason() {
        Some(reason) => println!("\nDone after {} comparisons: {reason}", session.comparisons()),
        None => println!(
            "\nStopped early after {} comparisons; standings so far:",
            session.comparisons()
        ),
    }
    let mut ranking = session.finish();
    if cli.ascending {
        export::sort_ascending(&mut ranking);
    }
    print_ranking(&ranking);

    if let Some(path) = &cli.text {
        save(path, &ranking, export::write_text)?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = &cli.csv {
        save(path, &ranking, export::write_csv)?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = &cli.json {
        save(path, &ranking, export::write_json)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn print_ranking(ranking: &[RankedMovie]) {
    for (i, ranked) in ranking.iter().enumerate() {
        println!(
            "{:>3}. {:<50} {:>5} ({} matches)",
            i + 1,
            ranked.movie.label(),
            ranked.rating,
            ranked.matches
        );
    }
}
