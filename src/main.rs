// Entry point and high-level CLI flow.
//
// - Option [1] loads the advisor export and prints load diagnostics.
// - Option [2] analyzes it, writes the JSON result plus CSV breakdowns and
//   prints markdown previews.
// `--batch` runs both once without the menu.
use advisor_report::output::{self, load_notes, preview_table, summary_rows};
use advisor_report::{analyze_with, loader, AnalyzerConfig, RawTable};
use anyhow::{Context, Result};
use clap::Parser;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "advisor_report", version)]
#[command(about = "Summarize cloud advisor recommendation exports", long_about = None)]
struct Cli {
    /// Export to analyze (.csv, .tsv or .json)
    #[arg(short, long, default_value = "advisor_recommendations.csv")]
    input: PathBuf,

    /// YAML analyzer configuration
    #[arg(short, long, env = "ADVISOR_REPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for analysis.json and the CSV summaries
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Ignore rows past this count
    #[arg(long)]
    max_rows: Option<usize>,

    /// Load, analyze and write reports without the interactive menu
    #[arg(long)]
    batch: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

struct Settings {
    input: PathBuf,
    output_dir: PathBuf,
    config: AnalyzerConfig,
}

// Loaded export, kept so reports can be regenerated without reloading.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<RawTable>,
}

/// `None` once stdin is closed.
fn read_choice() -> Option<String> {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Report Selection (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        if io::stdin().read_line(&mut buf).unwrap_or(0) == 0 {
            return false;
        }
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn handle_load(settings: &Settings) -> Result<()> {
    let (table, report) = loader::load_table(&settings.input, settings.config.max_rows)
        .with_context(|| format!("Failed to load {}", settings.input.display()))?;
    for line in load_notes(&report) {
        println!("{line}");
    }
    println!();
    let mut state = APP_STATE.lock().unwrap_or_else(PoisonError::into_inner);
    state.data = Some(table);
    Ok(())
}

fn handle_generate_reports(settings: &Settings) -> Result<()> {
    let data = {
        let state = APP_STATE.lock().unwrap_or_else(PoisonError::into_inner);
        state.data.clone()
    };
    let Some(table) = data else {
        println!("Error: No data loaded. Please load the export first (option 1).\n");
        return Ok(());
    };

    println!("Analyzing recommendations...");
    let result = analyze_with(&table, &settings.config).context("Analysis failed")?;
    let files = output::write_reports(&settings.output_dir, &result)
        .context("Failed to write reports")?;
    println!("Outputs saved to individual files...\n");

    preview_table("Advisor Summary", &summary_rows(&result), usize::MAX);
    preview_table(
        "Category Distribution",
        &result.category_analysis.distribution.entries(),
        10,
    );
    preview_table(
        "Impact Distribution",
        &result.impact_analysis.distribution.entries(),
        3,
    );
    preview_table(
        "Top Resource Types",
        &result.resource_analysis.top_resource_types,
        5,
    );

    if result.has_warnings() {
        println!("Data quality notes:");
        for field in &result.metadata.missing_columns {
            println!("  - no column found for {field}");
        }
        for w in &result.metadata.warnings {
            println!("  - {w}");
        }
        println!();
    }
    for f in files {
        println!("(Exported {})", f.display());
    }
    println!();
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => AnalyzerConfig::from_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };
    if cli.max_rows.is_some() {
        config.max_rows = cli.max_rows;
    }
    let settings = Settings {
        input: cli.input,
        output_dir: cli.output_dir,
        config,
    };

    if cli.batch {
        handle_load(&settings)?;
        return handle_generate_reports(&settings);
    }

    loop {
        println!("Advisor Report:");
        println!("[1] Load the export");
        println!("[2] Generate analysis\n");
        let Some(choice) = read_choice() else {
            break;
        };
        match choice.as_str() {
            "1" => {
                if let Err(e) = handle_load(&settings) {
                    eprintln!("{e:#}\n");
                }
            }
            "2" => {
                println!();
                if let Err(e) = handle_generate_reports(&settings) {
                    eprintln!("{e:#}\n");
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
    Ok(())
}
