use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{bail, Context};
use printkit::{
    init_logging, leveling_from_config, Config, GcodeFile, JobSummary, LevelingData,
    ProgressMonitor, BUILD_DATE, VERSION,
};

const USAGE: &str = "Usage: printkit <file.gcode> [--config <path>] [--level <samples.json> --output <path>]";

/// Command-line options
#[derive(Debug, Default, PartialEq)]
struct Args {
    input: PathBuf,
    config: Option<PathBuf>,
    level: Option<PathBuf>,
    output: Option<PathBuf>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Args> {
    let mut input = None;
    let mut parsed = Args::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .map(PathBuf::from)
                .with_context(|| format!("{} needs a value", flag))
        };
        match arg.as_str() {
            "--config" => parsed.config = Some(value("--config")?),
            "--level" => parsed.level = Some(value("--level")?),
            "--output" => parsed.output = Some(value("--output")?),
            flag if flag.starts_with("--") => bail!("Unknown option {}\n{}", flag, USAGE),
            path if input.is_none() => input = Some(PathBuf::from(path)),
            extra => bail!("Unexpected argument {}\n{}", extra, USAGE),
        }
    }

    parsed.input = input.context(USAGE)?;
    if parsed.level.is_some() != parsed.output.is_some() {
        bail!("--level and --output must be given together\n{}", USAGE);
    }
    Ok(parsed)
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logging()?;
    tracing::debug!("printkit {} (built {})", VERSION, BUILD_DATE);

    let args = parse_args(std::env::args().skip(1))?;

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => match Config::default_path() {
            Ok(path) => Config::load_or_default(&path)?,
            Err(_) => Config::default(),
        },
    };

    let mut monitor = ProgressMonitor::new()
        .with_interval(config.loading.progress_interval())
        .with_reporter(|fraction, stage| {
            tracing::info!("{}: {:.0}%", stage, fraction * 100.0);
        });
    let file = GcodeFile::load(&args.input, &config.kinematics, &mut monitor)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    println!("{}", JobSummary::new(&args.input, &file, &config));

    if let (Some(samples), Some(output)) = (&args.level, &args.output) {
        let content = std::fs::read_to_string(samples)
            .with_context(|| format!("Failed to read {}", samples.display()))?;
        let data: LevelingData = serde_json::from_str(&content)
            .with_context(|| format!("Invalid leveling data in {}", samples.display()))?;
        let leveling = leveling_from_config(&data, &config)?;

        let writer = BufWriter::new(File::create(output)?);
        leveling.write_leveled(&file, writer)?;
        tracing::info!("Wrote leveled G-code to {}", output.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_input_only() {
        let parsed = parse_args(args(&["part.gcode"])).unwrap();
        assert_eq!(parsed.input, PathBuf::from("part.gcode"));
        assert!(parsed.config.is_none());
    }

    #[test]
    fn test_parse_all_options() {
        let parsed = parse_args(args(&[
            "--config",
            "c.toml",
            "part.gcode",
            "--level",
            "mesh.json",
            "--output",
            "out.gcode",
        ]))
        .unwrap();
        assert_eq!(parsed.config, Some(PathBuf::from("c.toml")));
        assert_eq!(parsed.level, Some(PathBuf::from("mesh.json")));
        assert_eq!(parsed.output, Some(PathBuf::from("out.gcode")));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["a.gcode", "b.gcode"])).is_err());
        assert!(parse_args(args(&["a.gcode", "--config"])).is_err());
        assert!(parse_args(args(&["a.gcode", "--verbose"])).is_err());
        assert!(parse_args(args(&["a.gcode", "--level", "mesh.json"])).is_err());
    }
}
