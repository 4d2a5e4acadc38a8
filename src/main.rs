use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use telenode::{ConvertOptions, Converter, InputFormat, PageRequest};
use tracing_subscriber::EnvFilter;

const ACCESS_TOKEN_VAR: &str = "TELEGRAPH_ACCESS_TOKEN";

#[derive(Debug, Default)]
struct Args {
    input: Option<PathBuf>,
    config: Option<PathBuf>,
    format: Option<InputFormat>,
    page_title: Option<String>,
    pretty: bool,
    verbose: bool,
}

fn main() -> Result<()> {
    let Some(args) = parse_args(env::args().skip(1))? else {
        print_usage();
        return Ok(());
    };
    init_logging(args.verbose);

    let mut options = match &args.config {
        Some(path) => ConvertOptions::from_json_file(path)
            .with_context(|| format!("failed to load options from {}", path.display()))?,
        None => ConvertOptions::default(),
    };
    if let Some(format) = args.format {
        options.format = format;
    }

    let source = match &args.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };

    let nodes = Converter::new(options).convert(&source);

    let output = match args.page_title {
        Some(title) => {
            let token = env::var(ACCESS_TOKEN_VAR).unwrap_or_default();
            to_json(&PageRequest::new(token, &title, nodes), args.pretty)?
        }
        None => to_json(&nodes, args.pretty)?,
    };
    println!("{output}");

    Ok(())
}

/// Returns `None` when help was requested.
fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Option<Args>> {
    let mut args = Args::default();

    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--html" => args.format = Some(InputFormat::Html),
            "--markdown" => args.format = Some(InputFormat::Markdown),
            "--pretty" => args.pretty = true,
            "-v" | "--verbose" => args.verbose = true,
            "--config" => {
                let path = raw.next().context("--config expects a file path")?;
                args.config = Some(PathBuf::from(path));
            }
            "--page" => {
                let title = raw.next().context("--page expects a title")?;
                args.page_title = Some(title);
            }
            flag if flag.starts_with('-') && flag != "-" => bail!("unknown option: {flag}"),
            _ => {
                if args.input.is_some() {
                    bail!("unexpected argument: {arg}");
                }
                if arg != "-" {
                    args.input = Some(PathBuf::from(arg));
                }
            }
        }
    }

    Ok(Some(args))
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("failed to serialize output")
}

fn print_usage() {
    eprintln!(
        "Usage: telenode [OPTIONS] [FILE]

Converts article HTML or Markdown into publishing API nodes (JSON).
Reads FILE, or stdin when FILE is omitted or `-`.

Options:
  --html           Treat the input as HTML
  --markdown       Treat the input as Markdown
  --config FILE    Load conversion options from a JSON file
  --page TITLE     Print a createPage payload instead of bare nodes
                   (token taken from {ACCESS_TOKEN_VAR})
  --pretty         Pretty-print the JSON output
  -v, --verbose    Log conversion steps to stderr
  -h, --help       Show this help"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Args>> {
        parse_args(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn test_parse_flags() {
        let args = parse(&["--markdown", "--pretty", "--page", "Title", "in.md"])
            .unwrap()
            .unwrap();
        assert_eq!(args.format, Some(InputFormat::Markdown));
        assert!(args.pretty);
        assert_eq!(args.page_title.as_deref(), Some("Title"));
        assert_eq!(args.input, Some(PathBuf::from("in.md")));
    }

    #[test]
    fn test_dash_means_stdin() {
        let args = parse(&["-"]).unwrap().unwrap();
        assert!(args.input.is_none());
    }

    #[test]
    fn test_help_and_errors() {
        assert!(parse(&["--help"]).unwrap().is_none());
        assert!(parse(&["--bogus"]).is_err());
        assert!(parse(&["--config"]).is_err());
        assert!(parse(&["a", "b"]).is_err());
    }
}
