//! opsgantt CLI - schedule board renderer
//!
//! Reads a schedule export (JSON), builds the board and renders it.

mod outline;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use opsgantt_core::{normalize_records, BoardVariant, GanttBoard, GanttConfig, Renderer};
use opsgantt_render::{HeaderRenderer, HtmlBoardRenderer, LeftPanelRenderer, RightPanelRenderer};

#[derive(Parser)]
#[command(name = "opsgantt")]
#[command(author, version, about = "Production schedule board renderer", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by every command that builds a board
#[derive(clap::Args)]
struct BoardArgs {
    /// Schedule export (JSON array, or object wrapping one)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Group tasks by product or by machine
    #[arg(long, default_value = "product")]
    variant: BoardVariant,

    /// Board configuration (TOML)
    #[arg(short, long, env = "OPSGANTT_CONFIG")]
    config: Option<PathBuf>,

    /// Reference instant for the fallback window (RFC 3339, defaults to now)
    #[arg(long)]
    now: Option<String>,

    /// Collapse a group by id (repeatable)
    #[arg(long = "collapse", value_name = "GROUP")]
    collapse: Vec<String>,

    /// Collapse every group
    #[arg(long)]
    collapse_all: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// Standalone HTML board
    Html,
    /// Header row only (SVG)
    Header,
    /// Label panel only (SVG)
    Left,
    /// Bar panel only (SVG)
    Right,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutlineFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the board
    Render {
        #[command(flatten)]
        board: BoardArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "html")]
        format: OutputFormat,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Page title
        #[arg(long, default_value = "Schedule")]
        title: String,

        /// Use the dark theme
        #[arg(long)]
        dark: bool,
    },

    /// Print the derived time range
    Range {
        #[command(flatten)]
        board: BoardArgs,
    },

    /// Print the visible rows with their geometry
    Rows {
        #[command(flatten)]
        board: BoardArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutlineFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Render {
            board,
            format,
            output,
            title,
            dark,
        }) => cmd_render(&board, format, output.as_deref(), title, dark),
        Some(Commands::Range { board }) => cmd_range(&board),
        Some(Commands::Rows { board, format }) => cmd_rows(&board, format),
        None => {
            println!("opsgantt - production schedule board renderer");
            println!("Run with --help for usage information");
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<GanttConfig> {
    let Some(path) = path else {
        return Ok(GanttConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: GanttConfig = toml::from_str(&text)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(s) => Ok(DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("Invalid --now instant '{}'", s))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

fn build_board(args: &BoardArgs) -> Result<GanttBoard> {
    let config = load_config(args.config.as_deref())?;
    let mut board = GanttBoard::new(config, args.variant).context("Invalid board configuration")?;

    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", args.file.display()))?;
    let records = normalize_records(&value);
    info!(
        file = %args.file.display(),
        records = records.len(),
        variant = args.variant.as_str(),
        "loaded schedule"
    );

    board.refresh_at(&records, parse_now(args.now.as_deref())?);

    if args.collapse_all {
        board.collapse_all_groups();
    }
    for id in &args.collapse {
        if !board.is_group_collapsed(id) {
            board.toggle_group(id);
        }
    }
    Ok(board)
}

fn cmd_render(
    args: &BoardArgs,
    format: OutputFormat,
    output: Option<&Path>,
    title: String,
    dark: bool,
) -> Result<()> {
    let board = build_board(args)?;
    let layout = board.layout();

    let rendered = match format {
        OutputFormat::Html => {
            let mut renderer = HtmlBoardRenderer::new().title(title);
            if dark {
                renderer = renderer.dark_theme();
            }
            renderer.render(&layout)
        }
        OutputFormat::Header => HeaderRenderer::new().render(&layout),
        OutputFormat::Left => LeftPanelRenderer::new().render(&layout),
        OutputFormat::Right => RightPanelRenderer::new().render(&layout),
    }
    .context("Rendering failed")?;

    match output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "wrote board");
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn cmd_range(args: &BoardArgs) -> Result<()> {
    let board = build_board(args)?;
    let range = board.range();
    let offset = board.config().offset()?;

    println!("start: {}", range.start.with_timezone(&offset).to_rfc3339());
    println!("end:   {}", range.end.with_timezone(&offset).to_rfc3339());
    println!("step:  {} min", range.step_minutes);
    println!("ticks: {}", range.column_count());
    println!("width: {}px", board.grid_width());
    Ok(())
}

fn cmd_rows(args: &BoardArgs, format: OutlineFormat) -> Result<()> {
    let board = build_board(args)?;
    let layout = board.layout();
    match format {
        OutlineFormat::Text => print!("{}", outline::text(&layout)),
        OutlineFormat::Json => println!("{}", serde_json::to_string_pretty(&outline::entries(&layout))?),
    }
    Ok(())
}
