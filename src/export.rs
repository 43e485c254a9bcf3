use crate::error::RankResult;
use crate::movie::RankedMovie;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// `1. Title (Year)`, one movie per line.
pub fn write_text(mut out: impl Write, ranking: &[RankedMovie]) -> RankResult<()> {
    for (rank, ranked) in ranking.iter().enumerate() {
        writeln!(out, "{}. {}", rank + 1, ranked.movie.label())?;
    }
    Ok(())
}

pub fn write_csv(mut out: impl Write, ranking: &[RankedMovie]) -> RankResult<()> {
    writeln!(out, "rank,id,title,year,rating,matches")?;
    for (rank, ranked) in ranking.iter().enumerate() {
        writeln!(
            out,
            "{},{},{},{},{},{}",
            rank + 1,
            escape_csv(&ranked.movie.id.to_string()),
            escape_csv(&ranked.movie.title),
            escape_csv(&ranked.movie.year),
            ranked.rating,
            ranked.matches
        )?;
    }
    Ok(())
}

#[derive(Serialize)]
struct Results<'a> {
    ranked_at: DateTime<Local>,
    movies: &'a [RankedMovie],
}

pub fn write_json(out: impl Write, ranking: &[RankedMovie]) -> RankResult<()> {
    let results = Results {
        ranked_at: Local::now(),
        movies: ranking,
    };
    serde_json::to_writer_pretty(out, &results)?;
    Ok(())
}

/// Turns a best-first ranking into worst-first. Ties keep their order.
pub fn sort_ascending(ranking: &mut [RankedMovie]) {
    ranking.sort_by_key(|m| m.rating);
}

pub fn save(
    path: &Path,
    ranking: &[RankedMovie],
    write: fn(BufWriter<File>, &[RankedMovie]) -> RankResult<()>,
) -> RankResult<()> {
    let file = File::create(path)?;
    write(BufWriter::new(file), ranking)
}

fn escape_csv(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
