// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structlink CLI: convert a canonical structural model to E2K.
//!
//! Usage:
//!   structlink <model.json> [--output out.e2k] [--unit u] [--tolerance t] [--grid g]
//!
//! Defaults come from `STRUCTLINK_*` environment variables, see
//! [`config::Config`]. Flags override them.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use structlink_e2k::{E2kExporter, ExportSummary};
use structlink_model::{CanonicalModel, LengthUnit};
use structlink_ram::ConversionReport;

mod config;

use config::Config;

#[derive(Debug, PartialEq)]
struct Args {
    input: PathBuf,
    output: PathBuf,
    unit: Option<LengthUnit>,
    tolerance: Option<f64>,
    grid: Option<f64>,
}

enum Command {
    Run(Args),
    Help,
}

fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let Some(first) = args.first() else {
        return Ok(Command::Help);
    };
    if first == "--help" || first == "-h" {
        return Ok(Command::Help);
    }

    let input = PathBuf::from(first);
    let mut output = None;
    let mut unit = None;
    let mut tolerance = None;
    let mut grid = None;

    let mut rest = args[1..].iter();
    while let Some(flag) = rest.next() {
        let mut value = || {
            rest.next()
                .with_context(|| format!("{flag} needs a value"))
        };
        match flag.as_str() {
            "--output" | "-o" => output = Some(PathBuf::from(value()?)),
            "--unit" => unit = Some(LengthUnit::from_name(value()?)?),
            "--tolerance" => tolerance = Some(parse_length(flag, value()?)?),
            "--grid" => grid = Some(parse_length(flag, value()?)?),
            other => bail!("unknown option: {other}"),
        }
    }

    let output = output.unwrap_or_else(|| input.with_extension("e2k"));
    Ok(Command::Run(Args {
        input,
        output,
        unit,
        tolerance,
        grid,
    }))
}

fn parse_length(flag: &str, value: &str) -> anyhow::Result<f64> {
    value
        .parse()
        .with_context(|| format!("invalid {flag} value: {value}"))
}

fn print_usage() {
    println!("Usage: structlink <model.json> [options]");
    println!();
    println!("Options:");
    println!("  -o, --output <path>    E2K file to write (default: input with .e2k)");
    println!("  --unit <u>             Length unit of the E2K file (in, ft, mm, cm, m)");
    println!("  --tolerance <t>        Point merge distance in output units");
    println!("  --grid <g>             Snapping grid in output units (default: at most t)");
    println!();
    println!("Environment: STRUCTLINK_GRID_SIZE, STRUCTLINK_TOLERANCE, STRUCTLINK_STORY_PREFIX,");
    println!("             STRUCTLINK_DIAPHRAGM, STRUCTLINK_CUSTOM_TEXT, RUST_LOG");
}

fn convert(args: &Args, config: &Config) -> anyhow::Result<ExportSummary> {
    let mut options = config.e2k_options()?;
    if let Some(tolerance) = args.tolerance {
        options.dedup.tolerance = tolerance;
        if args.grid.is_none() {
            options.dedup.grid_size = options.dedup.grid_size.min(tolerance);
        }
    }
    if let Some(grid) = args.grid {
        options.dedup.grid_size = grid;
    }

    let mut model = load_model(&args.input)?;
    if let Some(unit) = args.unit {
        model = model.with_length_unit(unit);
    }
    let document = E2kExporter::new(options)
        .export(&model)
        .context("E2K export failed")?;
    std::fs::write(&args.output, &document.text)
        .with_context(|| format!("cannot write {}", args.output.display()))?;
    tracing::info!(output = %args.output.display(), bytes = document.text.len(), "E2K written");
    Ok(document.summary)
}

fn load_model(path: &Path) -> anyhow::Result<CanonicalModel> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let model = CanonicalModel::from_json(&json)
        .with_context(|| format!("cannot parse {}", path.display()))?;
    model
        .validate()
        .with_context(|| format!("invalid model {}", path.display()))?;
    Ok(model)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,structlink=debug".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&args) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let config = Config::from_env();
    tracing::debug!(?config, input = %args.input.display(), "starting conversion");

    let report = match convert(&args, &config) {
        Ok(summary) => ConversionReport::succeeded(summary.to_string()),
        Err(err) => ConversionReport::failed(format!("{err:#}")),
    };
    println!("{report}");
    if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn output_defaults_next_to_input() {
        let Command::Run(parsed) = parse_args(&args(&["model.json"])).unwrap() else {
            panic!("expected run");
        };
        assert_eq!(parsed.output, PathBuf::from("model.e2k"));
        assert_eq!(parsed.tolerance, None);
    }

    #[test]
    fn flags_are_parsed() {
        let Command::Run(parsed) = parse_args(&args(&[
            "in.json",
            "--output",
            "out.e2k",
            "--tolerance",
            "0.5",
            "--grid",
            "0.125",
        ]))
        .unwrap() else {
            panic!("expected run");
        };
        assert_eq!(
            parsed,
            Args {
                input: PathBuf::from("in.json"),
                output: PathBuf::from("out.e2k"),
                unit: None,
                tolerance: Some(0.5),
                grid: Some(0.125),
            }
        );
    }

    #[test]
    fn bad_flags_are_errors() {
        assert!(parse_args(&args(&["in.json", "--tolerance"])).is_err());
        assert!(parse_args(&args(&["in.json", "--grid", "wide"])).is_err());
        assert!(parse_args(&args(&["in.json", "--verbose"])).is_err());
        assert!(parse_args(&args(&["in.json", "--unit", "furlong"])).is_err());
        assert!(matches!(parse_args(&args(&[])), Ok(Command::Help)));
    }

    #[test]
    fn missing_input_is_reported() {
        let parsed = Args {
            input: PathBuf::from("/nonexistent/model.json"),
            output: PathBuf::from("/nonexistent/model.e2k"),
            unit: None,
            tolerance: None,
            grid: None,
        };
        let err = convert(&parsed, &Config::from_vars(|_| None)).unwrap_err();
        assert!(format!("{err:#}").contains("cannot read"));
    }

    #[test]
    fn unit_flag_accepts_names() {
        let Command::Run(parsed) = parse_args(&args(&["in.json", "--unit", "Feet"])).unwrap()
        else {
            panic!("expected run");
        };
        assert_eq!(parsed.unit, Some(LengthUnit::Foot));
    }

    #[test]
    fn tolerance_alone_narrows_the_grid() {
        let dir = std::env::temp_dir().join(format!("structlink-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("tight.json");
        std::fs::write(
            &input,
            r#"{ "layout": { "levels": [{ "id": "L1", "name": "Level 1", "elevation": 0.0 }] } }"#,
        )
        .unwrap();

        let parsed = Args {
            output: dir.join("tight.e2k"),
            input,
            unit: None,
            tolerance: Some(0.1),
            grid: None,
        };
        let summary = convert(&parsed, &Config::from_vars(|_| None)).unwrap();
        assert_eq!(summary.points, 0);
        assert!(parsed.output.exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
