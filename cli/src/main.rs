//! docgraph CLI - document span to graph tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docgraph::export::{self, CHUNKS_FILE};
use docgraph::{
    CsvFigureSource, FigureRecord, FigureSource, JsonFormat, JsonSpanSource, LevelSource,
    OrphanPolicy, Pipeline, PipelineOptions, PipelineStats, SpanSource,
};

#[derive(Parser)]
#[command(name = "docgraph")]
#[command(version)]
#[command(about = "Turn document text spans into chunks and a typed document graph", long_about = None)]
struct Cli {
    /// JSON file with pipeline settings
    #[arg(long, global = true, value_name = "FILE", env = "DOCGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Treatment of chunks before the first section
    #[arg(long, global = true, value_enum)]
    orphans: Option<OrphanMode>,

    /// Let style-classified headings define section levels too
    #[arg(long, global = true)]
    heading_levels: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk a JSON span dump into the chunk table
    Chunks {
        /// Input span dump (JSON array)
        #[arg(value_name = "SPANS")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Build the graph tables from a chunk table
    Graph {
        /// Input chunk table
        #[arg(value_name = "CHUNKS")]
        input: PathBuf,

        /// Figure metadata table
        #[arg(long, value_name = "FILE")]
        figures: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Write compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Export the graph of a chunk table as one GraphRAG JSON document
    Export {
        /// Input chunk table
        #[arg(value_name = "CHUNKS")]
        input: PathBuf,

        /// Figure metadata table
        #[arg(long, value_name = "FILE")]
        figures: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Run every stage: spans to chunk table and graph tables
    Run {
        /// Input span dump (JSON array)
        #[arg(value_name = "SPANS")]
        input: PathBuf,

        /// Figure metadata table
        #[arg(long, value_name = "FILE")]
        figures: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Write compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show chunk table statistics
    Info {
        /// Input chunk table
        #[arg(value_name = "CHUNKS")]
        input: PathBuf,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OrphanMode {
    /// Leave chunks before the first heading unattached (default)
    Drop,
    /// Attach them to a synthetic document root section
    DocumentRoot,
}

impl From<OrphanMode> for OrphanPolicy {
    fn from(mode: OrphanMode) -> Self {
        match mode {
            OrphanMode::Drop => OrphanPolicy::Drop,
            OrphanMode::DocumentRoot => OrphanPolicy::DocumentRoot,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = load_options(cli.config.as_deref(), cli.orphans, cli.heading_levels)
        .and_then(|options| {
            let pipeline = Pipeline::new(options);
            match cli.command {
                Some(Commands::Chunks { input, output }) => {
                    cmd_chunks(&pipeline, &input, output.as_deref())
                }
                Some(Commands::Graph {
                    input,
                    figures,
                    output,
                    compact,
                }) => cmd_graph(
                    &pipeline,
                    &input,
                    figures.as_deref(),
                    output.as_deref(),
                    compact,
                ),
                Some(Commands::Export {
                    input,
                    figures,
                    output,
                    compact,
                }) => cmd_export(
                    &pipeline,
                    &input,
                    figures.as_deref(),
                    output.as_deref(),
                    compact,
                ),
                Some(Commands::Run {
                    input,
                    figures,
                    output,
                    compact,
                }) => cmd_run(
                    &pipeline,
                    &input,
                    figures.as_deref(),
                    output.as_deref(),
                    compact,
                ),
                Some(Commands::Info { input, json }) => cmd_info(&pipeline, &input, json),
                Some(Commands::Version) => {
                    cmd_version();
                    Ok(())
                }
                None => {
                    println!("{}", "Usage: docgraph <COMMAND> <INPUT>".yellow());
                    println!("       docgraph --help for more information");
                    Ok(())
                }
            }
        });

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn load_options(
    config: Option<&Path>,
    orphans: Option<OrphanMode>,
    heading_levels: bool,
) -> CliResult<PipelineOptions> {
    let mut options = match config {
        Some(path) => PipelineOptions::from_file(path)?,
        None => PipelineOptions::default(),
    };

    if let Some(mode) = orphans {
        options.hierarchy = options.hierarchy.with_orphan_policy(mode.into());
    }
    if heading_levels {
        options.hierarchy = options
            .hierarchy
            .with_level_source(LevelSource::ParagraphsAndHeadings);
    }
    Ok(options)
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn read_figures(path: Option<&Path>) -> CliResult<Vec<FigureRecord>> {
    match path {
        Some(path) => Ok(CsvFigureSource::new(path).figures()?),
        None => Ok(Vec::new()),
    }
}

fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    PathBuf::from(format!("{}_graph", stem))
}

fn progress(steps: u64) -> CliResult<ProgressBar> {
    let pb = ProgressBar::new(steps);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn print_outputs(paths: &[PathBuf]) {
    println!("\n{}", "Output files:".green().bold());
    for (i, path) in paths.iter().enumerate() {
        let branch = if i + 1 == paths.len() { "└─" } else { "├─" };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        println!("  {} {}", branch.dimmed(), name);
    }
}

fn cmd_chunks(pipeline: &Pipeline, input: &Path, output: Option<&Path>) -> CliResult<()> {
    let spans = JsonSpanSource::new(input).spans()?;
    let chunks = pipeline.build_chunks(spans)?;

    if let Some(path) = output {
        export::write_chunks_file(&chunks, path)?;
        println!(
            "{} {} chunks to {}",
            "Saved".green(),
            chunks.len(),
            path.display()
        );
    } else {
        export::write_chunks(&chunks, std::io::stdout().lock())?;
    }

    Ok(())
}

fn cmd_graph(
    pipeline: &Pipeline,
    input: &Path,
    figures: Option<&Path>,
    output: Option<&Path>,
    compact: bool,
) -> CliResult<()> {
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| default_output_dir(input));

    let pb = progress(3)?;

    pb.set_message("Reading chunks...");
    let chunks = export::read_chunks_file(input)?;
    let figures = read_figures(figures)?;
    pb.inc(1);

    pb.set_message("Building graph...");
    let result = pipeline.build_graph(chunks, &figures)?;
    pb.inc(1);

    pb.set_message("Writing tables...");
    let paths = export::write_graph_dir(&result.graph, &output_dir, json_format(compact))?;
    pb.inc(1);

    pb.finish_with_message("Done!");
    print_outputs(&paths);
    print_graph_summary(&result.stats);
    Ok(())
}

fn cmd_export(
    pipeline: &Pipeline,
    input: &Path,
    figures: Option<&Path>,
    output: Option<&Path>,
    compact: bool,
) -> CliResult<()> {
    let chunks = export::read_chunks_file(input)?;
    let figures = read_figures(figures)?;
    let result = pipeline.build_graph(chunks, &figures)?;
    let json = export::to_json(&result.graph, json_format(compact))?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_run(
    pipeline: &Pipeline,
    input: &Path,
    figures: Option<&Path>,
    output: Option<&Path>,
    compact: bool,
) -> CliResult<()> {
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| default_output_dir(input));
    fs::create_dir_all(&output_dir)?;

    let pb = progress(4)?;

    pb.set_message("Reading spans...");
    let spans = JsonSpanSource::new(input).spans()?;
    let span_count = spans.len();
    pb.inc(1);

    pb.set_message("Chunking...");
    let chunks = pipeline.build_chunks(spans)?;
    let chunks_path = output_dir.join(CHUNKS_FILE);
    export::write_chunks_file(&chunks, &chunks_path)?;
    pb.inc(1);

    pb.set_message("Building graph...");
    let figures = read_figures(figures)?;
    let mut result = pipeline.build_graph(chunks, &figures)?;
    result.stats.span_count = span_count;
    pb.inc(1);

    pb.set_message("Writing tables...");
    let mut paths = vec![chunks_path];
    paths.extend(export::write_graph_dir(
        &result.graph,
        &output_dir,
        json_format(compact),
    )?);
    pb.inc(1);

    pb.finish_with_message("Done!");
    print_outputs(&paths);
    print_graph_summary(&result.stats);
    Ok(())
}

fn print_graph_summary(stats: &PipelineStats) {
    println!();
    println!("{}", "Graph Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    if stats.span_count > 0 {
        println!("{}: {}", "Spans".bold(), stats.span_count);
    }
    println!("{}: {}", "Chunks".bold(), stats.chunk_count);
    println!("{}: {}", "Sections".bold(), stats.section_count);
    println!("{}: {}", "List items".bold(), stats.list_item_count);
    println!("{}: {}", "Figures".bold(), stats.figure_count);
    println!(
        "{}: {} references, {} urls",
        "Links".bold(),
        stats.reference_count,
        stats.url_count
    );
    println!(
        "{}: {} nodes, {} edges",
        "Total".bold(),
        stats.node_count,
        stats.edge_count
    );
}

fn cmd_info(pipeline: &Pipeline, input: &Path, json: bool) -> CliResult<()> {
    let chunks = export::read_chunks_file(input)?;
    let stats = PipelineStats::for_chunks(&chunks);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "Chunk Table".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Chunks".bold(), stats.chunk_count);
    if let (Some(first), Some(last)) = (chunks.first(), chunks.last()) {
        println!(
            "{}: {}-{}",
            "Pages".bold(),
            first.page_start,
            last.page_end
        );
    }

    println!();
    println!("{}", "Chunk Types".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (chunk_type, count) in &stats.chunk_types {
        println!("{}: {}", chunk_type.bold(), count);
    }

    println!();
    println!("{}", "Section Levels".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    match pipeline.build_hierarchy(&chunks) {
        Ok(hierarchy) => {
            for (size, level) in &hierarchy.levels.sizes {
                println!("{}: {}pt", format!("L{}", level).bold(), size);
            }
            println!("{}: {}", "Sections".bold(), hierarchy.arena.len());
        }
        Err(e) => println!("{}", e.to_string().yellow()),
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docgraph".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document span to graph tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_options_flags() {
        let options = load_options(None, Some(OrphanMode::DocumentRoot), true).unwrap();
        assert_eq!(options.hierarchy.orphan_policy, OrphanPolicy::DocumentRoot);
        assert_eq!(
            options.hierarchy.level_source,
            LevelSource::ParagraphsAndHeadings
        );
    }

    #[test]
    fn test_load_options_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"chunker": {"small_gap": 4.0}}"#).unwrap();

        let options = load_options(Some(&path), None, false).unwrap();
        assert_eq!(options.chunker.small_gap, 4.0);
        assert_eq!(options.hierarchy.orphan_policy, OrphanPolicy::Drop);
    }

    #[test]
    fn test_default_output_dir() {
        assert_eq!(
            default_output_dir(Path::new("data/manual.csv")),
            PathBuf::from("manual_graph")
        );
        assert_eq!(json_format(true), JsonFormat::Compact);
    }
}
