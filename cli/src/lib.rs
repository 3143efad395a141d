/*
 * SPDX-FileCopyrightText: 2026 The striperank contributors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
#![deny(unstable_features)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_pub)]
#![deny(unreachable_patterns)]
#![deny(unused_macro_rules)]
#![deny(unused_doc_comments)]

use anyhow::{Context, Result, anyhow, bail, ensure};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dsi_progress_logger::ProgressLog;
use serde::Serialize;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use std::time::SystemTime;
use striperank::graph::ArcList;

pub mod build_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));

    pub fn version_string() -> String {
        format!(
            "{}
build info: {} build for {} with {}",
            PKG_VERSION, PROFILE, TARGET, RUSTC_VERSION
        )
    }
}

/// Parses the number of threads from a string.
///
/// This function is meant to be used with `#[arg(...,  value_parser =
/// num_threads_parser)]`.
pub fn num_threads_parser(arg: &str) -> Result<usize> {
    let num_threads = arg.parse::<usize>()?;
    ensure!(num_threads > 0, "Number of threads must be greater than 0");
    Ok(num_threads)
}

/// Shared CLI arguments for commands that specify a number of threads.
#[derive(Args, Debug)]
pub struct NumThreadsArg {
    #[arg(short = 'j', long, default_value_t = rayon::current_num_threads().max(1), value_parser = num_threads_parser)]
    /// The number of threads to use.
    pub num_threads: usize,
}

/// A node of a ranking, as stored in JSON format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct RankedNode {
    node: usize,
    score: f64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
/// Formats for storing rankings.
pub enum RankingFormat {
    /// ASCII format, one `<node> <score>` pair per line.
    Ascii,
    /// A JSON array of objects with fields `node` and `score`.
    Json,
}

impl RankingFormat {
    /// Writes pairs (node, score) using the format defined by `self`.
    ///
    /// If the format is ASCII, `precision` will be used to truncate scores to
    /// the specified number of decimal digits.
    pub fn write(
        &self,
        mut writer: impl Write,
        ranked: &[(usize, f64)],
        precision: Option<usize>,
    ) -> Result<()> {
        match self {
            RankingFormat::Ascii => match precision {
                None => striperank::rank::write_ranking(&mut writer, ranked)?,
                Some(precision) => {
                    for (node, score) in ranked {
                        writeln!(writer, "{node} {score:.precision$}")?;
                    }
                }
            },
            RankingFormat::Json => {
                let nodes: Vec<RankedNode> = ranked
                    .iter()
                    .map(|&(node, score)| RankedNode { node, score })
                    .collect();
                serde_json::to_writer(&mut writer, &nodes)?;
                writeln!(writer)?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// Stores pairs (node, score) in the specified `path` using the format
    /// defined by `self`.
    pub fn store(
        &self,
        path: impl AsRef<Path>,
        ranked: &[(usize, f64)],
        precision: Option<usize>,
    ) -> Result<()> {
        create_parent_dir(&path)?;
        let path_display = path.as_ref().display();
        let file = std::fs::File::create(&path)
            .with_context(|| format!("Could not create ranking at {}", path_display))?;
        log::info!("Storing {} scores at {}", ranked.len(), path_display);
        self.write(BufWriter::new(file), ranked, precision)
            .with_context(|| format!("Could not write ranking to {}", path_display))
    }
}

/// Reads a list of arcs from a file, or from standard input if `path` is
/// `-`.
pub fn read_arcs(path: impl AsRef<Path>, pl: &mut impl ProgressLog) -> Result<ArcList> {
    let path = path.as_ref();
    if path.as_os_str() == "-" {
        log::info!("Reading arcs from standard input");
        return Ok(ArcList::read_with_logging(std::io::stdin().lock(), pl)?);
    }
    log::info!("Reading arcs from {}", path.display());
    let file = std::fs::File::open(path)
        .with_context(|| format!("Could not open {}", path.display()))?;
    ArcList::read_with_logging(BufReader::new(file), pl)
        .with_context(|| format!("Could not read arcs from {}", path.display()))
}

/// Creates a [`ThreadPool`](rayon::ThreadPool) with the given number of threads.
pub fn get_thread_pool(num_threads: usize) -> Result<rayon::ThreadPool> {
    let thread_pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .context("Failed to create thread pool")?;
    log::info!("Using {} threads", thread_pool.current_num_threads());
    Ok(thread_pool)
}

/// Creates all parent directories of the given file path.
pub fn create_parent_dir(file_path: impl AsRef<Path>) -> Result<()> {
    // ensure that the dst directory exists
    if let Some(parent_dir) = file_path.as_ref().parent() {
        std::fs::create_dir_all(parent_dir).with_context(|| {
            format!(
                "Failed to create the directory {:?}",
                parent_dir.to_string_lossy()
            )
        })?;
    }
    Ok(())
}

/// Parses a duration from a string.
/// If no suffix is given, it is assumed to be in milliseconds.
/// You can use suffixes, the available ones are:
/// - `s` for seconds
/// - `m` for minutes
/// - `h` for hours
/// - `d` for days
///
/// Example: `1d2h3m4s567` this is parsed as: 1 day, 2 hours, 3 minutes, 4 seconds, and 567 milliseconds.
fn parse_duration(value: &str) -> Result<Duration> {
    if value.is_empty() {
        bail!("Empty duration string, if you want every 0 milliseconds use `0`.");
    }
    let mut duration = Duration::from_secs(0);
    let mut acc = String::new();
    for c in value.chars() {
        if c.is_ascii_digit() {
            acc.push(c);
        } else if c.is_whitespace() {
            continue;
        } else {
            let dur = acc.parse::<u64>()?;
            match c {
                's' => duration += Duration::from_secs(dur),
                'm' => duration += Duration::from_secs(dur * 60),
                'h' => duration += Duration::from_secs(dur * 60 * 60),
                'd' => duration += Duration::from_secs(dur * 60 * 60 * 24),
                _ => return Err(anyhow!("Invalid duration suffix: {}", c)),
            }
            acc.clear();
        }
    }
    if !acc.is_empty() {
        let dur = acc.parse::<u64>()?;
        duration += Duration::from_millis(dur);
    }
    Ok(duration)
}

/// Initializes the `env_logger` logger with a custom format including
/// timestamps with elapsed time since initialization.
pub fn init_env_logger() -> Result<()> {
    use jiff::SpanRound;
    use jiff::fmt::friendly::{Designator, Spacing, SpanPrinter};

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    let start = std::time::Instant::now();
    let printer = SpanPrinter::new()
        .spacing(Spacing::None)
        .designator(Designator::Compact);
    let span_round = SpanRound::new()
        .largest(jiff::Unit::Day)
        .smallest(jiff::Unit::Millisecond)
        .days_are_24_hours();

    builder.format(move |buf, record| {
        let Ok(ts) = jiff::Timestamp::try_from(SystemTime::now()) else {
            return Err(std::io::Error::other("Failed to get timestamp"));
        };
        let style = buf.default_level_style(record.level());
        let elapsed = start.elapsed();
        let span = jiff::Span::new()
            .seconds(elapsed.as_secs() as i64)
            .milliseconds(elapsed.subsec_millis() as i64);
        let span = span.round(span_round).map_err(std::io::Error::other)?;
        writeln!(
            buf,
            "{} {} {style}{}{style:#} [{:?}] {} - {}",
            ts.strftime("%F %T%.3f"),
            printer.span_to_string(&span),
            record.level(),
            std::thread::current().id(),
            record.target(),
            record.args()
        )
    });
    builder.try_init()?;
    Ok(())
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    #[arg(long, value_parser = parse_duration, global=true, display_order = 1000)]
    /// How often to log progress. Default is 10s. You can use the suffixes "s"
    /// for seconds, "m" for minutes, "h" for hours, and "d" for days. If no
    /// suffix is provided it is assumed to be in milliseconds.
    /// Example: "1d2h3m4s567" is parsed as 1 day + 2 hours + 3 minutes + 4
    /// seconds + 567 milliseconds = 93784567 milliseconds.
    pub log_interval: Option<Duration>,
}

#[derive(Subcommand, Debug)]
pub enum SubCommands {
    Rank(rank::CliArgs),
    Check(check::CliArgs),
}

#[derive(Parser, Debug)]
#[command(name = "striperank", version=build_info::version_string())]
/// Computes PageRank on graphs given as lists of arcs, under different
/// memory budgets.
///
/// Noteworthy environment variables:
///
/// - RUST_LOG: configuration for env_logger
///   <https://docs.rs/env_logger/latest/env_logger/>
///
/// - RAYON_NUM_THREADS: the default number of threads
pub struct Cli {
    #[command(subcommand)]
    pub command: SubCommands,
    #[clap(flatten)]
    pub args: GlobalArgs,
}

pub mod check;
pub mod rank;

/// The entry point of the command-line interface.
pub fn cli_main<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let start = std::time::Instant::now();
    let cli = Cli::parse_from(args);
    match cli.command {
        SubCommands::Rank(args) => {
            rank::main(cli.args, args)?;
        }
        SubCommands::Check(args) => {
            check::main(cli.args, args)?;
        }
    }

    log::info!(
        "The command took {}",
        pretty_print_elapsed(start.elapsed().as_secs_f64())
    );

    Ok(())
}

/// Pretty-prints seconds in a human-readable format.
fn pretty_print_elapsed(elapsed: f64) -> String {
    let mut result = String::new();
    let mut elapsed_seconds = elapsed as u64;
    let days = elapsed_seconds / (60 * 60 * 24);
    elapsed_seconds %= 60 * 60 * 24;
    let hours = elapsed_seconds / (60 * 60);
    elapsed_seconds %= 60 * 60;
    let minutes = elapsed_seconds / 60;

    match days {
        0 => {}
        1 => result.push_str("1 day "),
        _ => result.push_str(&format!("{} days ", days)),
    }
    match hours {
        0 => {}
        1 => result.push_str("1 hour "),
        _ => result.push_str(&format!("{} hours ", hours)),
    }
    match minutes {
        0 => {}
        1 => result.push_str("1 minute "),
        _ => result.push_str(&format!("{} minutes ", minutes)),
    }

    result.push_str(&format!("{:.3} seconds ({}s)", elapsed % 60.0, elapsed));
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    mod ranking_format {
        use super::*;

        #[test]
        fn test_ascii() {
            let mut out = Vec::new();
            RankingFormat::Ascii
                .write(&mut out, &[(3, 0.5), (1, 0.25)], None)
                .unwrap();
            assert_eq!(String::from_utf8(out).unwrap(), "3 0.5\n1 0.25\n");
        }

        #[test]
        fn test_ascii_with_precision() {
            let mut out = Vec::new();
            RankingFormat::Ascii
                .write(&mut out, &[(2, 0.123456789), (1, 0.987654321)], Some(3))
                .unwrap();
            assert_eq!(String::from_utf8(out).unwrap(), "2 0.123\n1 0.988\n");
        }

        #[test]
        fn test_json() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("ranking.json");
            RankingFormat::Json
                .store(&path, &[(2, 0.75), (1, 0.25)], None)
                .unwrap();
            let content = std::fs::read_to_string(&path).unwrap();
            let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
            assert_eq!(
                parsed,
                serde_json::json!([{"node": 2, "score": 0.75}, {"node": 1, "score": 0.25}])
            );
        }

        #[test]
        fn test_json_empty() {
            let mut out = Vec::new();
            RankingFormat::Json.write(&mut out, &[], None).unwrap();
            assert_eq!(String::from_utf8(out).unwrap().trim(), "[]");
        }

        #[test]
        fn test_creates_parent_dirs() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("a").join("b").join("ranking.txt");
            RankingFormat::Ascii.store(&path, &[(1, 1.0)], None).unwrap();
            assert_eq!(std::fs::read_to_string(&path).unwrap(), "1 1\n");
        }
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("567").unwrap(), Duration::from_millis(567));
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(
            parse_duration("1d2h3m4s567").unwrap(),
            Duration::from_millis(93_784_567)
        );
        assert!(parse_duration("").is_err());
        assert!(parse_duration("3x").is_err());
    }

    #[test]
    fn test_num_threads_parser() {
        assert_eq!(num_threads_parser("4").unwrap(), 4);
        assert!(num_threads_parser("0").is_err());
        assert!(num_threads_parser("four").is_err());
    }

    #[test]
    fn test_pretty_print_elapsed() {
        assert_eq!(pretty_print_elapsed(1.5), "1.500 seconds (1.5s)");
        assert_eq!(
            pretty_print_elapsed(3725.0),
            "1 hour 2 minutes 5.000 seconds (3725s)"
        );
    }

    fn write_graph(dir: &Path, content: &str) -> std::path::PathBuf {
        let path = dir.join("graph.txt");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_rank_command() {
        let dir = tempfile::tempdir().unwrap();
        let graph = write_graph(dir.path(), "# cycle\n1 2\n2 3\n3 1\n");
        let output = dir.path().join("out").join("ranking.txt");
        for engine in ["dense", "sparse", "block", "stripe"] {
            cli_main([
                "striperank",
                "rank",
                graph.to_str().unwrap(),
                "-e",
                engine,
                "-b",
                "2",
                "-o",
                output.to_str().unwrap(),
                "--check",
            ])
            .unwrap();
            let content = std::fs::read_to_string(&output).unwrap();
            let lines: Vec<&str> = content.lines().collect();
            assert_eq!(lines.len(), 3);
            for (line, expected_id) in lines.iter().zip(["1", "2", "3"]) {
                let mut fields = line.split(' ');
                assert_eq!(fields.next(), Some(expected_id));
                let score: f64 = fields.next().unwrap().parse().unwrap();
                assert!((score - 1.0 / 3.0).abs() < 1E-12);
            }
        }
    }

    #[test]
    fn test_rank_command_json_top() {
        let dir = tempfile::tempdir().unwrap();
        let graph = write_graph(dir.path(), "1 4\n2 4\n3 4\n4 1\n");
        let output = dir.path().join("ranking.json");
        cli_main([
            "striperank",
            "rank",
            graph.to_str().unwrap(),
            "--fmt",
            "json",
            "--top",
            "2",
            "-o",
            output.to_str().unwrap(),
        ])
        .unwrap();
        let content = std::fs::read_to_string(&output).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        let nodes = parsed.as_array().unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0]["node"], 4);
        assert_eq!(nodes[1]["node"], 1);
    }

    #[test]
    fn test_rank_command_errors() {
        let dir = tempfile::tempdir().unwrap();
        let holes = write_graph(dir.path(), "1 2\n2 4\n");
        assert!(cli_main(["striperank", "rank", holes.to_str().unwrap()]).is_err());
        assert!(cli_main(["striperank", "check", holes.to_str().unwrap()]).is_err());

        let graph = write_graph(dir.path(), "1 2\n2 1\n");
        let graph = graph.to_str().unwrap();
        assert!(cli_main(["striperank", "rank", graph, "-a", "1.0"]).is_err());
        assert!(cli_main(["striperank", "rank", graph, "-t", "0"]).is_err());
        assert!(cli_main(["striperank", "rank", graph, "-b", "0"]).is_err());

        let missing = dir.path().join("missing.txt");
        assert!(cli_main(["striperank", "check", missing.to_str().unwrap()]).is_err());
    }

    #[test]
    fn test_rank_command_non_convergence() {
        let dir = tempfile::tempdir().unwrap();
        let graph = write_graph(dir.path(), "1 2\n2 3\n3 1\n1 3\n");
        let output = dir.path().join("ranking.txt");
        let result = cli_main([
            "striperank",
            "rank",
            graph.to_str().unwrap(),
            "-t",
            "1e-15",
            "--max-iter",
            "2",
            "-o",
            output.to_str().unwrap(),
        ]);
        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_check_command() {
        let dir = tempfile::tempdir().unwrap();
        let graph = write_graph(dir.path(), "1 2\n2 3\n1 3\n");
        cli_main(["striperank", "check", graph.to_str().unwrap()]).unwrap();
    }
}
