use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use comchip_core::{
    DEFAULT_GENERATED_AT, DecodeReport, FrameInput, FrameLayout, Variant, compute_checksum,
    decode_inputs, format_hex, parse_hex_frame,
};
use glob::glob;
use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

mod render;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("COMCHIP_BUILD_COMMIT"),
    ", ",
    env!("COMCHIP_BUILD_DATE"),
    ")"
);

const DECODE_EXAMPLES: &str = "Examples:\n  comchip frame decode \"55 81 00 96 FE 00 E8\"\n  comchip frame decode --variant compact 558100 96FEE8\n  comchip frame decode -i captures/*.txt --json --pretty\n  comchip frame decode -i frames.txt -o report.json --strict";

#[derive(Parser, Debug)]
#[command(name = "comchip")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Validate and decode COMChip battery-status frames.",
    long_about = None,
    after_help = DECODE_EXAMPLES
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on raw status frames.
    Frame {
        #[command(subcommand)]
        command: FrameCommands,
    },
    /// Inspect frame layouts.
    Layout {
        #[command(subcommand)]
        command: LayoutCommands,
    },
}

#[derive(Subcommand, Debug)]
enum FrameCommands {
    /// Validate frames and decode their battery status.
    #[command(alias = "parse")]
    #[command(after_help = DECODE_EXAMPLES)]
    Decode {
        /// Frames as hex text (e.g. "55 81 00 96 FE 00 E8")
        frames: Vec<String>,

        /// Fixture files (or glob patterns) with one hex frame per line
        #[arg(short = 'i', long = "input")]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Write the JSON report to stdout instead of text
        #[arg(long, conflicts_with = "report")]
        json: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Output report path (JSON)
        #[arg(short = 'o', long)]
        report: Option<PathBuf>,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if any frame is rejected
        #[arg(long)]
        strict: bool,
    },
    /// Compute the checksum of a data span seeded with a command id.
    Checksum {
        /// Command id used as the checksum seed (hex)
        #[arg(long)]
        seed: String,

        /// Data bytes covered by the checksum (hex)
        data: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum LayoutCommands {
    /// Print the effective layout as JSON.
    Show {
        #[command(flatten)]
        layout: LayoutArgs,
    },
}

#[derive(Args, Debug)]
struct LayoutArgs {
    /// Protocol variant preset (compact: 6 bytes, extended: 7 bytes)
    #[arg(long, default_value_t = Variant::Extended)]
    variant: Variant,

    /// JSON layout file overriding the preset
    #[arg(long = "layout", value_name = "FILE", conflicts_with = "variant")]
    layout_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Frame { command } => match command {
            FrameCommands::Decode {
                frames,
                inputs,
                layout,
                json,
                pretty,
                report,
                quiet,
                strict,
            } => cmd_frame_decode(frames, inputs, layout, json, pretty, report, quiet, strict),
            FrameCommands::Checksum { seed, data, json } => cmd_frame_checksum(&seed, &data, json),
        },
        Commands::Layout { command } => match command {
            LayoutCommands::Show { layout } => cmd_layout_show(layout),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_frame_decode(
    frames: Vec<String>,
    inputs: Vec<PathBuf>,
    layout_args: LayoutArgs,
    json: bool,
    pretty: bool,
    report_path: Option<PathBuf>,
    quiet: bool,
    strict: bool,
) -> Result<(), CliError> {
    if frames.is_empty() && inputs.is_empty() {
        return Err(CliError::new(
            "no frames to decode",
            Some("pass hex frames as arguments or use -i/--input".to_string()),
        ));
    }

    let (layout_name, layout) = resolve_layout(&layout_args)?;

    let mut frame_inputs: Vec<FrameInput> = frames
        .iter()
        .enumerate()
        .map(|(index, text)| FrameInput::new(format!("arg:{}", index + 1), text.as_str()))
        .collect();
    for pattern in &inputs {
        for path in resolve_input_paths(pattern)? {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read input file: {}", path.display()))?;
            frame_inputs.extend(FrameInput::from_lines(&path.display().to_string(), &text));
        }
    }

    let mut report = decode_inputs(frame_inputs, &layout, &layout_name);
    report.generated_at = now_rfc3339();

    if json {
        print!("{}", serialize_report(&report, pretty)?);
    } else if !quiet {
        let text = render::render_report(&report)
            .map_err(|err| CliError::new(format!("failed to render report: {}", err), None))?;
        print!("{}", text);
    }

    if let Some(path) = report_path.as_ref() {
        write_report(path, &serialize_report(&report, pretty)?)?;
        if !quiet {
            eprintln!("OK: report written -> {}", path.display());
        }
    }

    if strict && report.summary.frames_rejected > 0 {
        return Err(CliError::new(
            format!(
                "{} of {} frames rejected",
                report.summary.frames_rejected, report.summary.frames_total
            ),
            Some("run without --strict to inspect each frame".to_string()),
        ));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ChecksumOutput {
    seed: String,
    data: String,
    checksum: String,
}

fn cmd_frame_checksum(seed: &str, data: &[String], json: bool) -> Result<(), CliError> {
    let seed_bytes = parse_hex_frame(seed).map_err(|err| {
        CliError::new(
            format!("invalid seed '{}': {}", seed, err),
            Some("pass the command id as one hex byte, e.g. --seed 0x81".to_string()),
        )
    })?;
    let seed = match seed_bytes.as_slice() {
        [seed] => *seed,
        _ => {
            return Err(CliError::new(
                format!("seed must be a single byte, got {}", seed_bytes.len()),
                Some("pass the command id as one hex byte, e.g. --seed 0x81".to_string()),
            ));
        }
    };

    let data = if data.is_empty() {
        Vec::new()
    } else {
        parse_hex_frame(&data.join(" ")).map_err(|err| {
            CliError::new(
                format!("invalid data: {}", err),
                Some("pass data bytes as hex, e.g. 00 96 FE".to_string()),
            )
        })?
    };

    let checksum = compute_checksum(seed, &data);
    if json {
        let output = ChecksumOutput {
            seed: format_hex(&[seed]),
            data: format_hex(&data),
            checksum: format_hex(&[checksum]),
        };
        let json = serde_json::to_string(&output).context("JSON serialization failed")?;
        println!("{}", json);
    } else {
        println!("{:02X}", checksum);
    }
    Ok(())
}

fn cmd_layout_show(layout_args: LayoutArgs) -> Result<(), CliError> {
    let (_, layout) = resolve_layout(&layout_args)?;
    let json = serde_json::to_string_pretty(&layout).context("JSON serialization failed")?;
    println!("{}", json);
    Ok(())
}

fn resolve_layout(args: &LayoutArgs) -> Result<(String, FrameLayout), CliError> {
    let Some(path) = args.layout_file.as_ref() else {
        return Ok((args.variant.name().to_string(), args.variant.layout()));
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read layout file: {}", path.display()))?;
    let layout = FrameLayout::from_json(&json).map_err(|err| {
        CliError::new(
            format!("invalid layout '{}': {}", path.display(), err),
            Some("start from `comchip layout show --variant compact`".to_string()),
        )
    })?;
    Ok(("custom".to_string(), layout))
}

fn serialize_report(report: &DecodeReport, pretty: bool) -> Result<String, CliError> {
    if pretty {
        serde_json::to_string_pretty(report)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(report)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn write_report(path: &Path, json: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(path, json).with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(())
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| DEFAULT_GENERATED_AT.to_string())
}

fn resolve_input_paths(input: &Path) -> Result<Vec<PathBuf>, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        if !input.is_file() {
            return Err(CliError::new(
                format!("input file not found: {}", input.display()),
                Some("pass a text file with one hex frame per line".to_string()),
            ));
        }
        return Ok(vec![input.to_path_buf()]);
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    matches.sort();
    Ok(matches)
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
