//! Core logic behind the `tx-review` binary.
//!
//! Reads a transaction, rejects it unless it is canonical, and prints every
//! page the way a display would show it.

use std::path::PathBuf;

use tracing::debug;
use tx_json_tokens::TokenTree;

use crate::config::ReviewConfig;
use crate::copy::{CopyDelegate, PlainCopy, SanitizingCopy};
use crate::error::ReviewError;
use crate::pages::ReviewContext;
use crate::session::{render_all, RenderedPage, ReviewSession};

pub const USAGE: &str = "\
Usage: tx-review [OPTIONS] [FILE]

Validates a canonical JSON transaction and prints its review pages.
The transaction is read from FILE, or from stdin when FILE is omitted.
One trailing line ending is dropped before validation.

Options:
  --config <FILE>         Load settings from a JSON file
  --key-capacity <N>      Key display buffer size in bytes
  --value-capacity <N>    Value display buffer size in bytes
  --sanitize              Replace non-printable bytes with '?'
  --json                  Print pages as a JSON array
  -h, --help              Print this help";

/// Parsed command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub key_capacity: Option<usize>,
    pub value_capacity: Option<usize>,
    pub sanitize: bool,
    pub json: bool,
    pub help: bool,
    pub input: Option<PathBuf>,
}

/// Parse arguments, program name excluded.
pub fn parse_args<I>(args: I) -> Result<CliOptions, ReviewError>
where
    I: IntoIterator<Item = String>,
{
    let mut options = CliOptions::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => options.config = Some(PathBuf::from(value_of(&arg, args.next())?)),
            "--key-capacity" => options.key_capacity = Some(number_of(&arg, args.next())?),
            "--value-capacity" => options.value_capacity = Some(number_of(&arg, args.next())?),
            "--sanitize" => options.sanitize = true,
            "--json" => options.json = true,
            "-h" | "--help" => options.help = true,
            flag if flag.starts_with('-') && flag != "-" => {
                return Err(ReviewError::Usage(format!("Unknown option: {flag}")));
            }
            path => {
                if options.input.is_some() {
                    return Err(ReviewError::Usage(format!("Unexpected argument: {path}")));
                }
                if path != "-" {
                    options.input = Some(PathBuf::from(path));
                }
            }
        }
    }
    Ok(options)
}

fn value_of(flag: &str, value: Option<String>) -> Result<String, ReviewError> {
    value.ok_or_else(|| ReviewError::Usage(format!("{flag} requires a value")))
}

fn number_of(flag: &str, value: Option<String>) -> Result<usize, ReviewError> {
    let value = value_of(flag, value)?;
    value
        .parse()
        .map_err(|_| ReviewError::Usage(format!("{flag} expects a number, got '{value}'")))
}

/// Settings from the config file (if any) with command-line overrides.
pub fn resolve_config(options: &CliOptions) -> Result<ReviewConfig, ReviewError> {
    let mut config = match &options.config {
        Some(path) => ReviewConfig::load(path)?,
        None => ReviewConfig::default(),
    };
    if let Some(n) = options.key_capacity {
        config.key_capacity = n;
    }
    if let Some(n) = options.value_capacity {
        config.value_capacity = n;
    }
    config.sanitize |= options.sanitize;
    config.check()?;
    Ok(config)
}

/// Drop a single trailing `\n` or `\r\n` left by editors and shells.
pub fn strip_line_ending(mut bytes: Vec<u8>) -> Vec<u8> {
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
    }
    bytes
}

/// Tokenize, validate and render `bytes`, returning the text to print.
pub fn review(bytes: Vec<u8>, config: &ReviewConfig, json: bool) -> Result<String, ReviewError> {
    let session = ReviewSession::from_bytes(bytes, config)?;
    debug!(tokens = session.tree().len(), "transaction tokenized");
    let pages = if config.sanitize {
        render_session(&session.context(SanitizingCopy), config)?
    } else {
        render_session(&session.context(PlainCopy), config)?
    };
    if json {
        Ok(serde_json::to_string_pretty(&pages)?)
    } else {
        Ok(format_pages(&pages))
    }
}

fn render_session<T, C>(
    ctx: &ReviewContext<'_, T, C>,
    config: &ReviewConfig,
) -> Result<Vec<RenderedPage>, ReviewError>
where
    T: TokenTree + ?Sized,
    C: CopyDelegate,
{
    ctx.validate()?;
    Ok(render_all(ctx, config.key_capacity, config.value_capacity)?)
}

/// One `<n>/<total> <key>: <value>` line per page.
pub fn format_pages(pages: &[RenderedPage]) -> String {
    let total = pages.len();
    pages
        .iter()
        .map(|p| format!("{}/{} {}: {}", p.index + 1, total, p.key, p.value))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    const EXAMPLE: &str = r#"{"account_number":"1","chain_id":"x","data":"","memo":"","msgs":[{"k":"v"}],"sequence":"0","source":"0"}"#;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let options = parse_args(args(&[
            "--key-capacity",
            "20",
            "--sanitize",
            "--json",
            "tx.json",
        ]))
        .unwrap();
        assert_eq!(options.key_capacity, Some(20));
        assert!(options.sanitize);
        assert!(options.json);
        assert_eq!(options.input, Some(PathBuf::from("tx.json")));
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(matches!(
            parse_args(args(&["--key-capacity"])),
            Err(ReviewError::Usage(_))
        ));
        assert!(matches!(
            parse_args(args(&["--value-capacity", "ten"])),
            Err(ReviewError::Usage(_))
        ));
        assert!(matches!(
            parse_args(args(&["--bogus"])),
            Err(ReviewError::Usage(_))
        ));
        assert!(matches!(
            parse_args(args(&["a.json", "b.json"])),
            Err(ReviewError::Usage(_))
        ));
    }

    #[test]
    fn test_stdin_dash() {
        let options = parse_args(args(&["-"])).unwrap();
        assert_eq!(options.input, None);
    }

    #[test]
    fn test_flags_override_defaults() {
        let options = parse_args(args(&["--value-capacity", "9"])).unwrap();
        let config = resolve_config(&options).unwrap();
        assert_eq!(config.value_capacity, 9);
        assert_eq!(config.key_capacity, ReviewConfig::default().key_capacity);

        let options = parse_args(args(&["--value-capacity", "1"])).unwrap();
        assert!(matches!(resolve_config(&options), Err(ReviewError::Config(_))));
    }

    #[test]
    fn test_strip_line_ending() {
        assert_eq!(strip_line_ending(b"{}\n".to_vec()), b"{}");
        assert_eq!(strip_line_ending(b"{}\r\n".to_vec()), b"{}");
        assert_eq!(strip_line_ending(b"{}\n\n".to_vec()), b"{}\n");
        assert_eq!(strip_line_ending(b"{}".to_vec()), b"{}");
    }

    #[test]
    fn test_review_text() {
        let out = review(EXAMPLE.as_bytes().to_vec(), &ReviewConfig::default(), false).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "1/7 chain_id: x");
        assert_eq!(lines[6], "7/7 msgs_0/k: v");
    }

    #[test]
    fn test_review_json() {
        let out = review(EXAMPLE.as_bytes().to_vec(), &ReviewConfig::default(), true).unwrap();
        let pages: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(pages[6]["key"], "msgs_0/k");
        assert_eq!(pages[6]["value"], "v");
        assert_eq!(pages[6]["chunks"], 1);
    }

    #[test]
    fn test_review_rejects_non_canonical() {
        let err = review(b"{\"b\":1,\"a\":2}".to_vec(), &ReviewConfig::default(), false)
            .unwrap_err();
        assert!(matches!(
            err,
            ReviewError::Validation(ValidationError::UnsortedKeys)
        ));
        assert_eq!(err.to_string(), "Dictionaries are not sorted");
    }
}
