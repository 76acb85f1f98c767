use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sitelens_analyzers::{AnalyzerConfig, default_analyzers};
use sitelens_core::orchestrator::{DEFAULT_TIMEOUT, DEFAULT_WORKER_LIMIT};
use sitelens_core::report::{render_report, write_report};
use sitelens_core::{
    AnalysisRequest, BusinessDescriptor, CompositeReport, Orchestrator, Profile, ReportFormat,
    ReportStore, TargetDescriptor,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

pub const DATABASE_FILE: &str = "sitelens.db";

pub fn print_banner() {
    println!(
        "{}",
        r#"
   _____ _ __       __
  / ___/(_) /____  / /   ___  ____  _____
  \__ \/ / __/ _ \/ /   / _ \/ __ \/ ___/
 ___/ / / /_/  __/ /___/  __/ / / (__  )
/____/_/\__/\___/_____/\___/_/ /_/____/
"#
        .bright_cyan()
        .bold()
    );
    println!(
        "  {} {}\n",
        "composite web presence analysis".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

/// Load and parse targets from a newline-delimited file. Blank lines and
/// `#` comments are skipped.
pub fn load_urls_from_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read hosts file {}", path.display()))?;

    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_url_line)
        .collect();

    if urls.is_empty() {
        bail!("No valid URLs found in {}", path.display());
    }

    Ok(urls)
}

/// Parse a single line as a URL, adding https:// to bare hosts
pub fn parse_url_line(line: &str) -> Option<String> {
    if line.contains("://") && Url::parse(line).is_ok() {
        return Some(line.to_string());
    }

    let with_scheme = format!("https://{}", line);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    warn!("Skipping invalid URL '{}'", line);
    None
}

/// Turn CLI input into a validated request. A URL makes a website analysis
/// (optionally with a business name for the listing lookup); without one the
/// business itself is the target.
pub fn build_request(
    url: Option<&str>,
    business_name: Option<&str>,
    category: Option<&str>,
    region: Option<&str>,
    profile: &str,
) -> Result<AnalysisRequest> {
    let profile: Profile = profile.parse()?;

    match (url, business_name) {
        (Some(url), business_name) => {
            if category.is_some() || region.is_some() {
                warn!("--category and --region only apply to business targets; ignoring them for {}", url);
            }
            let target = TargetDescriptor::parse_url(url)?;
            let request = AnalysisRequest::new(target, profile);
            match business_name {
                Some(name) => Ok(request.with_business_name(name)?),
                None => Ok(request),
            }
        }
        (None, Some(name)) => {
            let business = BusinessDescriptor::new(name, category, region)?;
            Ok(AnalysisRequest::new(
                TargetDescriptor::Business(business),
                profile,
            ))
        }
        (None, None) => bail!("Either --url, --hosts-file or --business-name must be provided"),
    }
}

pub fn analyzer_config(args: &ArgMatches) -> AnalyzerConfig {
    let value = |name: &str| args.get_one::<String>(name).cloned();

    AnalyzerConfig {
        http_timeout_secs: args
            .get_one::<u64>("timeout")
            .copied()
            .unwrap_or(DEFAULT_TIMEOUT.as_secs()),
        pagespeed_key: value("pagespeed-key"),
        pagespeed_endpoint: value("pagespeed-endpoint"),
        places_key: value("places-key"),
        places_endpoint: value("places-endpoint"),
        ai_key: value("ai-key"),
        ai_endpoint: value("ai-endpoint"),
        ai_model: value("ai-model"),
    }
}

pub fn build_orchestrator(
    config: &AnalyzerConfig,
    workers: usize,
    timeout_secs: u64,
) -> Result<Orchestrator> {
    let analyzers = default_analyzers(config).context("Failed to build analyzers")?;

    Ok(analyzers.into_iter().fold(
        Orchestrator::new()
            .with_worker_limit(workers)
            .with_timeout(Duration::from_secs(timeout_secs)),
        |orchestrator, analyzer| orchestrator.with_analyzer(analyzer),
    ))
}

/// Output path for the n-th report when several targets share one `--output`
pub fn numbered_output(path: &Path, index: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let name = match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, index, ext.to_string_lossy()),
        None => format!("{}-{}", stem, index),
    };
    path.with_file_name(name)
}

/// `--save` accepts either a database file or a directory created by `init`
fn resolve_database(location: &str) -> PathBuf {
    let expanded = shellexpand::tilde(location);
    let path = PathBuf::from(expanded.as_ref());
    if path.is_dir() {
        path.join(DATABASE_FILE)
    } else {
        path
    }
}

fn spinner(quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

pub async fn handle_analyze(args: &ArgMatches, quiet: bool) -> Result<()> {
    let profile = args
        .get_one::<String>("profile")
        .map(String::as_str)
        .unwrap_or("full");
    let format = ReportFormat::parse(
        args.get_one::<String>("format")
            .map(String::as_str)
            .unwrap_or("text"),
    )?;
    let business_name = args.get_one::<String>("business-name").map(String::as_str);
    let category = args.get_one::<String>("category").map(String::as_str);
    let region = args.get_one::<String>("region").map(String::as_str);

    let targets: Vec<Option<String>> = match args.get_one::<PathBuf>("hosts-file") {
        Some(hosts_file) => load_urls_from_file(hosts_file)?
            .into_iter()
            .map(Some)
            .collect(),
        None => vec![args.get_one::<String>("url").cloned()],
    };

    let requests = targets
        .iter()
        .map(|url| build_request(url.as_deref(), business_name, category, region, profile))
        .collect::<Result<Vec<_>>>()?;

    let workers = args
        .get_one::<usize>("workers")
        .copied()
        .unwrap_or(DEFAULT_WORKER_LIMIT);
    let timeout_secs = args
        .get_one::<u64>("timeout")
        .copied()
        .unwrap_or(DEFAULT_TIMEOUT.as_secs());
    let orchestrator = build_orchestrator(&analyzer_config(args), workers, timeout_secs)?;

    let store = match args.get_one::<String>("save") {
        Some(location) => {
            let path = resolve_database(location);
            let store = ReportStore::open(&path)
                .with_context(|| format!("Failed to open database {}", path.display()))?;
            Some(store)
        }
        None => None,
    };

    let spinner = spinner(quiet)?;
    let mut reports: Vec<(AnalysisRequest, CompositeReport)> = Vec::with_capacity(requests.len());
    for request in requests {
        spinner.set_message(format!(
            "Analyzing {} ({} profile)",
            request.target(),
            request.profile()
        ));
        let report = orchestrator.run(&request).await;
        info!(
            "{}: overall {} ({} degraded)",
            request.target(),
            report.overall_score,
            report.degraded_dimensions().len()
        );
        reports.push((request, report));
    }
    spinner.finish_and_clear();

    let output = args.get_one::<PathBuf>("output");
    let several = reports.len() > 1;
    for (index, (request, report)) in reports.iter().enumerate() {
        match output {
            Some(path) => {
                let path = if several {
                    numbered_output(path, index + 1)
                } else {
                    path.clone()
                };
                write_report(report, format, &path)
                    .with_context(|| format!("Failed to write report to {}", path.display()))?;
                if !quiet {
                    println!(
                        "{} Report for {} written to {}",
                        "✓".green().bold(),
                        request.target(),
                        path.display().to_string().bright_white()
                    );
                }
            }
            None => print!("{}", render_report(report, format)?),
        }

        if let Some(ref store) = store {
            let id = store.save(request, report)?;
            if !quiet {
                println!("{} Saved analysis {}", "✓".green().bold(), id.bright_white());
            }
        }
    }

    Ok(())
}

/// Create the config directory and a fresh report database inside it.
/// An existing database is only replaced when `force` is set.
pub fn initialize(config_dir: &Path, force: bool) -> Result<PathBuf> {
    let db_path = config_dir.join(DATABASE_FILE);

    if ReportStore::exists(&db_path) {
        if !force {
            bail!(
                "Database already exists at {} (use --force to replace it)",
                db_path.display()
            );
        }
        fs::remove_file(&db_path)
            .with_context(|| format!("Failed to remove {}", db_path.display()))?;
    }

    fs::create_dir_all(config_dir)
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;
    ReportStore::open(&db_path)
        .with_context(|| format!("Failed to create database {}", db_path.display()))?;

    Ok(db_path)
}

pub fn handle_init(args: &ArgMatches) -> Result<()> {
    print_divider();
    println!("{}", "  SITELENS INITIALIZATION".bright_white().bold());
    print_divider();
    println!();

    let location = args
        .get_one::<String>("PATH")
        .map(String::as_str)
        .unwrap_or("~/.config/sitelens/");
    let force = args.get_flag("force");
    let expanded = shellexpand::tilde(location);
    let config_dir = Path::new(expanded.as_ref());

    println!(
        "{} Target: {}",
        "→".blue(),
        config_dir.display().to_string().bright_white()
    );

    let db_path = initialize(config_dir, force)?;

    println!("{} Config directory: {}", "✓".green().bold(), config_dir.display());
    println!("{} Database: {}", "✓".green().bold(), db_path.display());
    println!();
    println!(
        "Store reports with {}",
        format!("sitelens analyze --url <URL> --save {}", config_dir.display()).bright_cyan()
    );

    Ok(())
}
