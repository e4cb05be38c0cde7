use anyhow::{anyhow, Result};
use chrono::Local;
use clap::Parser;
use std::path::Path;

use timetable_render_core::calendar::save_with_format;
use timetable_render_core::calendar::week::{consecutive_weeks, iso_week_of};
use timetable_render_core::{
    ConfigManager, FileRenderSource, Locale, OutputFormat, ReconstructionStages, RenderSource,
    ScheduleConfig, ScheduleProcessor, WeekSchedule,
};

use timetable_render::HttpRenderSource;

#[derive(Parser)]
#[command(name = "timetable-render")]
#[command(about = "Rebuild weekly lessons from a timetable render and export them as a calendar")]
struct Args {
    /// Saved render JSON: one file for every week, or a directory of week-<year>-<ww>.json
    #[arg(short, long, conflicts_with = "signature")]
    input: Option<String>,

    /// Personal signature to fetch renders for from the render endpoint
    #[arg(short, long)]
    signature: Option<String>,

    /// First ISO week to export (default: current week)
    #[arg(short, long)]
    week: Option<u32>,

    /// ISO year of the first week (default: current ISO year)
    #[arg(short, long)]
    year: Option<i32>,

    /// Number of consecutive weeks to export (default: 3, or 1 for a single render file)
    #[arg(short = 'n', long)]
    weeks: Option<usize>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Built-in config preset: swedish or english
    #[arg(short, long, conflicts_with = "config")]
    locale: Option<String>,

    /// Output file path (if not specified, auto-generated from the source)
    #[arg(short, long)]
    output: Option<String>,

    /// Output format: ics or json
    #[arg(short = 'f', long, default_value = "ics")]
    format: String,

    /// Fail on lessons whose start label is later than their end label
    #[arg(long)]
    strict: bool,

    /// Show available config options and exit
    #[arg(long)]
    show_configs: bool,

    /// Enable detailed profiling of all pipeline steps
    #[arg(long)]
    profile: bool,

    /// Dump intermediate pipeline stages per week to a directory
    /// Captures: primitives, day columns and lessons as separate files
    #[arg(long)]
    dump_stages: bool,

    /// Directory for stage dump output
    #[arg(long, default_value = "test_outputs/stages")]
    stages_dir: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    println!("🗓️  Timetable Render Reconstruction");

    let mut manager = ConfigManager::new();

    if args.show_configs {
        show_help(&manager);
        return Ok(());
    }

    let format: OutputFormat = match args.format.parse() {
        Ok(format) => format,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(2);
        }
    };

    let mut config = match resolve_config(&args, &mut manager) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e:#}");
            std::process::exit(1);
        }
    };
    if args.strict {
        config.strict_time_order = true;
    }

    let source = match create_source(&args, &config) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(2);
        }
    };

    let week_count = week_count(&args);
    if week_count > 1 && is_single_file(&args) {
        println!("⚠️  Single render file: all {week_count} weeks get the same lessons");
    }

    let weeks = match weeks_to_process(args.year, args.week, week_count) {
        Ok(weeks) => weeks,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(2);
        }
    };

    let calendar_config = config.calendar.clone();
    let processor = ScheduleProcessor::new(config)?;

    if args.dump_stages {
        println!("\n🔬 Pipeline stage dump mode");
        for &(iso_year, week) in &weeks {
            if let Err(e) = dump_week_stages(&processor, source.as_ref(), iso_year, week, &args.stages_dir) {
                eprintln!("❌ Stage dump failed: {e:#}");
                std::process::exit(1);
            }
        }
        println!("\n✅ All stages dumped to: {}", args.stages_dir);
        return Ok(());
    }

    let mut schedules: Vec<WeekSchedule> = Vec::with_capacity(weeks.len());
    for &(iso_year, week) in &weeks {
        println!("📄 Processing week {iso_year}-W{week:02}");
        match processor.process_week(source.as_ref(), iso_year, week, args.profile) {
            Ok(schedule) => {
                println!("   - Lessons: {}", schedule.lessons.len());
                schedules.push(schedule);
            }
            Err(e) => {
                eprintln!("❌ Processing failed: {e:#}");
                std::process::exit(1);
            }
        }
    }

    let total: usize = schedules.iter().map(|s| s.lessons.len()).sum();
    println!("✅ Reconstructed {} lessons over {} weeks", total, schedules.len());

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args, format));

    save_with_format(&schedules, &output_path, format, &calendar_config)?;
    match format {
        OutputFormat::Ics => println!("💾 Calendar saved to: {}", output_path),
        OutputFormat::Json => println!("💾 Lessons saved to: {}", output_path),
    }

    Ok(())
}

/// Config file over its locale preset, or a built-in preset
fn resolve_config(args: &Args, manager: &mut ConfigManager) -> Result<ScheduleConfig> {
    if let Some(config_path) = &args.config {
        let locale = manager.load_config_from_file(config_path)?;
        println!("📋 Loaded config from: {} ({:?})", config_path, locale);
        return Ok(manager.get_config(&locale).clone());
    }

    let locale = match &args.locale {
        Some(name) => name.parse::<Locale>()?,
        None => Locale::default(),
    };
    println!("📋 Using built-in {:?} config", locale);
    Ok(manager.get_config(&locale).clone())
}

fn is_single_file(args: &Args) -> bool {
    args.input
        .as_deref()
        .is_some_and(|input| Path::new(input).is_file())
}

/// A single render file holds one week only, so export it once unless asked otherwise
fn week_count(args: &Args) -> usize {
    match args.weeks {
        Some(count) => count,
        None if is_single_file(args) => 1,
        None => 3,
    }
}

fn create_source(args: &Args, config: &ScheduleConfig) -> Result<Box<dyn RenderSource>> {
    if let Some(input) = &args.input {
        if !Path::new(input).exists() {
            return Err(anyhow!("Input render not found at: {input}"));
        }
        println!("📂 Reading renders from: {}", input);
        return Ok(Box::new(FileRenderSource::new(input)));
    }

    if let Some(signature) = &args.signature {
        println!("🌐 Fetching renders from: {}", config.render_request.url);
        return Ok(Box::new(HttpRenderSource::new(
            config.render_request.clone(),
            signature.clone(),
        )));
    }

    Err(anyhow!("Either --input <file> or --signature <id> is required"))
}

/// The ISO weeks to export, starting at the given or current week
fn weeks_to_process(year: Option<i32>, week: Option<u32>, count: usize) -> Result<Vec<(i32, u32)>> {
    let (current_year, current_week) = iso_week_of(Local::now().date_naive());
    let year = year.unwrap_or(current_year);
    let week = week.unwrap_or(current_week);

    if count == 0 {
        return Err(anyhow!("--weeks must be at least 1"));
    }
    consecutive_weeks(year, week, count)
        .ok_or_else(|| anyhow!("{year} has no ISO week {week}"))
}

fn default_output_path(args: &Args, format: OutputFormat) -> String {
    let stem = args
        .input
        .as_ref()
        .and_then(|p| Path::new(p).file_stem())
        .and_then(|s| s.to_str())
        .or(args.signature.as_deref())
        .unwrap_or("timetable");
    format!("{stem}_calendar.{}", format.extension())
}

fn dump_week_stages(
    processor: &ScheduleProcessor,
    source: &dyn RenderSource,
    iso_year: i32,
    week: u32,
    stages_dir: &str,
) -> Result<()> {
    let data = source.fetch_week(iso_year, week)?;
    let stages = processor.capture_stages(&data)?;
    let output_dir = format!("{stages_dir}/week-{iso_year}-{week:02}");
    save_stages(&stages, &output_dir, source.name(), iso_year, week)
}

fn show_help(manager: &ConfigManager) {
    println!("\n📋 Available Configuration Options:");
    println!("  --input <path>          Saved render JSON file or directory of week files");
    println!("  --signature <id>        Fetch renders for this signature");
    println!("  --week <n> --year <y>   First ISO week (default: current week)");
    println!("  --weeks <n>             Number of consecutive weeks (default: 3, 1 for a single file)");
    println!("  --config <path>         Load custom config file");
    println!("  --locale <name>         Built-in preset when no config file is given");
    println!("  --output <path>         Output file path (auto-generated if not specified)");
    println!("  --format <fmt>          Output format: ics or json");
    println!("  --strict                Reject lessons that end before they start");

    println!("\n📄 Output Formats:");
    println!("  ics   - iCalendar file, one event per lesson (default)");
    println!("  json  - Reconstructed weeks with their lessons");

    println!("\n🌍 Built-in presets (--locale, or config key `locale`):");
    for locale in manager.locales() {
        let config = manager.get_config(&locale);
        let default_marker = if locale == Locale::default() { " (default)" } else { "" };
        println!(
            "  {:<8} - {}{}",
            format!("{locale:?}"),
            config.weekday_labels.join(", "),
            default_marker
        );
    }

    println!("\n📝 Usage Examples:");
    println!("  cargo run -- -i render.json");
    println!("  cargo run -- -s 990101-1234 -w 43 -n 3 -o cal.ics");
    println!("  cargo run -- -i renders/ -c english.yaml -f json");
    println!("\n🔧 Logging: set RUST_LOG=debug for per-lesson details");
}

fn save_stages(
    stages: &ReconstructionStages,
    output_dir: &str,
    source_name: &str,
    iso_year: i32,
    week: u32,
) -> Result<()> {
    use std::fs;
    fs::create_dir_all(output_dir)?;

    // Stage 1: parsed primitives
    let primitives_path = format!("{}/stage1_primitives.json", output_dir);
    fs::write(&primitives_path, serde_json::to_string_pretty(&stages.primitives)?)?;
    println!(
        "  💾 {} ({} texts, {} boxes)",
        primitives_path,
        stages.primitives.texts.len(),
        stages.primitives.boxes.len()
    );

    // Stage 2: day columns
    let columns_path = format!("{}/stage2_columns.json", output_dir);
    fs::write(&columns_path, serde_json::to_string_pretty(&stages.columns)?)?;
    println!("  💾 {} ({} columns)", columns_path, stages.columns.len());

    // Stage 3: lessons
    let lessons_path = format!("{}/stage3_lessons.json", output_dir);
    fs::write(&lessons_path, serde_json::to_string_pretty(&stages.lessons)?)?;
    println!("  💾 {} ({} lessons)", lessons_path, stages.lessons.len());

    let summary = serde_json::json!({
        "source": source_name,
        "iso_year": iso_year,
        "week": week,
        "captured_at": chrono::Utc::now().to_rfc3339(),
        "stage_counts": {
            "texts": stages.primitives.texts.len(),
            "boxes": stages.primitives.boxes.len(),
            "columns": stages.columns.len(),
            "lessons": stages.lessons.len(),
        }
    });
    let summary_path = format!("{}/summary.json", output_dir);
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;
    println!("  💾 {}", summary_path);

    Ok(())
}
