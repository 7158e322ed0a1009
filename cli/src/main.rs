//! docsift CLI - PDF outline extraction and persona-driven analysis

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docsift::batch::{self, BatchReport};
use docsift::outline::{OutlineExtractor, StyleBaseline};
use docsift::persist::{self, JsonFormat};
use docsift::{
    AnalysisOptions, AnalysisResult, HeadingLevel, TextSource, DEFAULT_JOB, DEFAULT_PERSONA,
};

#[derive(Parser)]
#[command(name = "docsift")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract PDF outlines and rank sections for a persona", long_about = None)]
struct Cli {
    /// Input PDF file or directory (runs the outline stage)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract title and heading outline to JSON
    Outline {
        /// Input PDF file or directory of PDFs
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = "output")]
        output: PathBuf,
    },

    /// Rank sections of a PDF collection for a persona and job
    Analyze {
        /// Directory of PDFs
        #[arg(short, long, value_name = "DIR")]
        input: PathBuf,

        /// Directory of outline JSON files
        #[arg(long, value_name = "DIR")]
        outlines: PathBuf,

        /// Output file
        #[arg(
            short,
            long,
            value_name = "FILE",
            default_value = "output/analysis_output.json"
        )]
        output: PathBuf,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Run both stages over one directory
    Run {
        /// Directory of PDFs
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Output directory (outlines go to <DIR>/outlines)
        #[arg(short, long, value_name = "DIR", default_value = "output")]
        output: PathBuf,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct AnalysisArgs {
    /// Persona the analysis is performed for
    #[arg(long, env = "DOCSIFT_PERSONA", default_value = DEFAULT_PERSONA)]
    persona: String,

    /// Job-to-be-done of the persona
    #[arg(long, env = "DOCSIFT_JOB", default_value = DEFAULT_JOB)]
    job: String,

    /// JSON file with analysis options
    #[arg(long, env = "DOCSIFT_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of sections to select
    #[arg(long, env = "DOCSIFT_TOP_K")]
    top_k: Option<usize>,

    /// Number of top sections to summarize
    #[arg(long, env = "DOCSIFT_TOP_K_SUBSECTIONS")]
    top_k_subsections: Option<usize>,

    /// Relevance weight between 0 (diversity only) and 1 (relevance only)
    #[arg(long, env = "DOCSIFT_DIVERSITY")]
    diversity: Option<f32>,

    /// Texts per embedding batch
    #[arg(long, env = "DOCSIFT_BATCH_SIZE")]
    batch_size: Option<usize>,

    /// Sentence-transformer model ID or directory (needs the `minilm` feature)
    #[arg(long, env = "DOCSIFT_MODEL")]
    model: Option<String>,

    /// Allow GPU inference for the sentence-transformer model
    #[arg(long, env = "DOCSIFT_ALLOW_GPU")]
    allow_gpu: bool,

    /// Output compact JSON
    #[arg(long)]
    compact: bool,
}

impl AnalysisArgs {
    /// Options from the config file (or defaults) with flags applied on top.
    fn options(&self) -> docsift::Result<AnalysisOptions> {
        let mut options = match &self.config {
            Some(path) => {
                log::info!("Loading options from {}", path.display());
                AnalysisOptions::from_json_file(path)?
            }
            None => AnalysisOptions::default(),
        };
        if let Some(k) = self.top_k {
            options = options.with_top_k_sections(k);
        }
        if let Some(k) = self.top_k_subsections {
            options = options.with_top_k_subsections(k);
        }
        if let Some(lambda) = self.diversity {
            options = options.with_diversity(lambda);
        }
        if let Some(size) = self.batch_size {
            options.embed = options.embed.with_batch_size(size);
        }
        if let Some(model) = &self.model {
            options.embed = options.embed.with_model(model.clone());
        }
        if self.allow_gpu {
            options.embed = options.embed.with_force_cpu(false);
        }
        options.validate()?;
        Ok(options)
    }

    fn format(&self) -> JsonFormat {
        if self.compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Outline { input, output }) => cmd_outline(&input, &output),
        Some(Commands::Analyze {
            input,
            outlines,
            output,
            analysis,
        }) => cmd_analyze(&input, &outlines, &output, &analysis),
        Some(Commands::Run {
            input,
            output,
            analysis,
        }) => cmd_run(&input, &output, &analysis),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: outline if input is provided
            if let Some(input) = cli.input {
                cmd_outline(&input, Path::new("output"))
            } else {
                println!("{}", "Usage: docsift <INPUT>".yellow());
                println!("       docsift --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}

fn outline_stage(input: &Path, output: &Path) -> Result<BatchReport, Box<dyn std::error::Error>> {
    let files = if input.is_dir() {
        batch::list_pdfs(input)?
    } else {
        vec![input.to_path_buf()]
    };
    std::fs::create_dir_all(output)?;

    let extractor = OutlineExtractor::new();
    let pb = progress_bar(files.len() as u64);
    let mut report = BatchReport::default();

    for path in files {
        let name = path.file_name().unwrap_or_default().to_string_lossy().into_owned();
        pb.set_message(name.clone());
        match batch::outline_one(&extractor, &path, output) {
            Ok(target) => report.succeeded.push(target),
            Err(e) => {
                pb.println(format!("{} {}: {}", "Failed".red(), name, e));
                report.failed.push((path, e.to_string()));
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done!");
    Ok(report)
}

fn print_report(report: &BatchReport) {
    println!("\n{}", "Outline files:".green().bold());
    let count = report.succeeded.len();
    for (i, path) in report.succeeded.iter().enumerate() {
        let branch = if i + 1 == count { "└─" } else { "├─" };
        println!("  {} {}", branch.dimmed(), path.display());
    }
    if !report.failed.is_empty() {
        println!(
            "{} {} of {} documents failed",
            "Warning:".yellow().bold(),
            report.failed.len(),
            report.total()
        );
    }
}

fn cmd_outline(input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let report = outline_stage(input, output)?;
    print_report(&report);
    Ok(())
}

fn cmd_analyze(
    input: &Path,
    outlines: &Path,
    output: &Path,
    args: &AnalysisArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = args.options()?;
    let start = Instant::now();

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Ranking sections...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    let result = batch::analyze_collection(input, outlines, &options, &args.persona, &args.job)?;
    spinner.finish_and_clear();

    persist::write_json(output, &result, args.format())?;
    print_summary(&result, start.elapsed().as_secs_f64(), output);
    Ok(())
}

fn print_summary(result: &AnalysisResult, seconds: f64, output: &Path) {
    let rule = "=".repeat(50);
    println!("\n{}", rule);
    println!("{}", "PIPELINE COMPLETED".green().bold());
    println!("{}: {:.2} seconds", "Total Processing Time".bold(), seconds);
    println!(
        "{}: {}",
        "Input Documents".bold(),
        result.metadata.input_documents.len()
    );
    println!("{}: {}", "Persona".bold(), result.metadata.persona);
    println!("{}: {}", "Job".bold(), result.metadata.job_to_be_done);
    println!(
        "{}: {}",
        "Top Sections Extracted".bold(),
        result.extracted_sections.len()
    );
    println!(
        "{}: {}",
        "Sub-sections Analyzed".bold(),
        result.subsection_analysis.len()
    );
    println!("{} {}", "Output saved to".green(), output.display());
    println!("{}", rule);
}

fn cmd_run(
    input: &Path,
    output: &Path,
    args: &AnalysisArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let outlines = output.join("outlines");
    let report = outline_stage(input, &outlines)?;
    print_report(&report);

    cmd_analyze(input, &outlines, &output.join("analysis_output.json"), args)
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let layout = docsift::load_file(input)?;
    let baseline = StyleBaseline::collect(layout.pages());
    let outline = OutlineExtractor::new().extract(&layout);

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), layout.page_count());
    println!("{}: {:.1}", "Body Size".bold(), baseline.body_size);

    let title = if outline.title.is_empty() {
        "(none)".dimmed().to_string()
    } else {
        outline.title.clone()
    };
    println!("{}: {}", "Title".bold(), title);

    println!();
    println!("{}", "Outline Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for level in [HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3] {
        println!("{}: {}", level.as_str().bold(), outline.count_level(level));
    }

    let words: usize = layout
        .pages()
        .iter()
        .flat_map(|p| p.blocks.iter())
        .flat_map(|b| b.lines.iter())
        .map(|l| l.text().split_whitespace().count())
        .sum();
    println!("{}: {}", "Words".bold(), words);

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docsift".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF outline extraction and persona-driven section analysis");
    println!();
    println!("License: MIT");
}
