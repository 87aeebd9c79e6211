use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use portfolio_parser::config::Settings;
use portfolio_parser::markdown::{extract_section, extract_subsection};
use portfolio_parser::resume::{self, ExperienceExtractor, ResumeFormat};
use portfolio_parser::service::ContentService;
use portfolio_parser::source::GitHubSource;
use portfolio_parser::template::{parse_project, parse_universal};

#[derive(Parser)]
#[command(name = "portfolio_parser", about = "Parse portfolio templates and résumés into JSON")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a project template into the fixed project schema
    Project {
        /// Local markdown file, or `owner/repo` to fetch from GitHub
        source: String,
        /// Re-fetch even if cached
        #[arg(long)]
        refresh: bool,
    },
    /// Parse a template into the schema-free section map
    Universal {
        /// Local markdown file, or `owner/repo` to fetch from GitHub
        source: String,
    },
    /// Print the body of one section of a markdown file
    Section {
        file: PathBuf,
        /// Header text without the leading #s
        header: String,
        /// Stop at this header instead of the next one of the same level
        #[arg(short, long)]
        end: Option<String>,
        /// Look for a ### subsection instead of a ## section
        #[arg(long)]
        sub: bool,
    },
    /// Extract work experience from a résumé (.pdf or plain text)
    Resume {
        /// Defaults to PORTFOLIO_RESUME_PATH
        path: Option<PathBuf>,
        /// Literal job-title markers, e.g. ENGINEER (repeatable)
        #[arg(short, long)]
        marker: Vec<String>,
    },
    /// Parse every .md file in a directory
    Batch {
        dir: PathBuf,
        /// Emit universal templates instead of project details
        #[arg(long)]
        universal: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;

    match cli.command {
        Commands::Project { source, refresh } => {
            if let Some(doc) = read_local(&source)? {
                print_json(&parse_project(&file_id(Path::new(&source)), &doc))?;
                return Ok(());
            }
            let mut service = remote_service(&settings);
            match service.get_project(&source, refresh).await? {
                Some(details) => print_json(&details)?,
                None => bail!("No template found for {}", source),
            }
        }
        Commands::Universal { source } => {
            if let Some(doc) = read_local(&source)? {
                print_json(&parse_universal(&file_id(Path::new(&source)), &doc))?;
                return Ok(());
            }
            let service = remote_service(&settings);
            match service.get_universal(&source).await? {
                Some(template) => print_json(&template)?,
                None => bail!("No template found for {}", source),
            }
        }
        Commands::Section {
            file,
            header,
            end,
            sub,
        } => {
            let doc = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let body = if sub {
                extract_subsection(&doc, &header, end.as_deref())
            } else {
                extract_section(&doc, &header, end.as_deref())
            };
            if body.is_empty() {
                warn!("Section '{}' not found or empty", header);
            }
            println!("{}", body);
        }
        Commands::Resume { path, marker } => {
            let path = path.unwrap_or_else(|| PathBuf::from(&settings.resume_path));
            let extractor = if marker.is_empty() {
                ExperienceExtractor::default()
            } else {
                let markers: Vec<&str> = marker.iter().map(String::as_str).collect();
                ExperienceExtractor::new(ResumeFormat::with_markers(&markers))
            };
            let entries = if is_pdf(&path) {
                extractor.parse_pdf(&path)
            } else {
                match std::fs::read_to_string(&path) {
                    Ok(text) => extractor.parse(&text),
                    Err(e) => {
                        warn!("Failed to read {}: {}", path.display(), e);
                        resume::fallback_experience()
                    }
                }
            };
            print_json(&entries)?;
        }
        Commands::Batch { dir, universal } => {
            let files = markdown_files(&dir)?;
            if files.is_empty() {
                println!("No .md files in {}", dir.display());
                return Ok(());
            }
            info!("Parsing {} templates...", files.len());
            if universal {
                print_json(&parse_all(&files, parse_universal)?)?;
            } else {
                print_json(&parse_all(&files, parse_project)?)?;
            }
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        info!("Done in {}", format_duration(elapsed));
    }
    Ok(())
}

fn remote_service(settings: &Settings) -> ContentService<GitHubSource> {
    ContentService::new(
        GitHubSource::new(settings),
        Duration::from_secs(settings.cache_ttl_secs),
    )
}

/// Contents of `source` if it names an existing file.
fn read_local(source: &str) -> anyhow::Result<Option<String>> {
    let path = Path::new(source);
    if !path.is_file() {
        return Ok(None);
    }
    let doc = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Some(doc))
}

fn file_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn markdown_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn parse_all<T, F>(files: &[PathBuf], parse: F) -> anyhow::Result<Vec<T>>
where
    T: Send,
    F: Fn(&str, &str) -> T + Sync,
{
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let results: Vec<_> = files
        .par_iter()
        .map(|path| {
            let parsed = std::fs::read_to_string(path).map(|doc| parse(&file_id(path), &doc));
            pb.inc(1);
            (path, parsed)
        })
        .collect();
    pb.finish_and_clear();

    let mut parsed = Vec::with_capacity(results.len());
    for (path, result) in results {
        match result {
            Ok(value) => parsed.push(value),
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }
    Ok(parsed)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
