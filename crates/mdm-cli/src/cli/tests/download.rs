//! Tests for the download subcommand.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::Path;

#[test]
fn cli_parse_download_defaults() {
    match parse(&["mdm", "download", "item.json"]) {
        CliCommand::Download {
            item,
            format,
            output_name,
            output_dir,
            referer,
            threads,
            yes,
        } => {
            assert_eq!(item, Path::new("item.json"));
            assert!(format.is_none());
            assert!(output_name.is_none());
            assert!(output_dir.is_none());
            assert_eq!(referer, "");
            assert!(threads.is_none());
            assert!(!yes);
        }
        _ => panic!("expected Download"),
    }
}

#[test]
fn cli_parse_download_short_flags() {
    match parse(&[
        "mdm",
        "download",
        "item.json",
        "-f",
        "hd",
        "-O",
        "My Clip",
        "-o",
        "/tmp/out",
        "-r",
        "https://example.com/watch",
        "-n",
        "4",
        "-y",
    ]) {
        CliCommand::Download {
            format,
            output_name,
            output_dir,
            referer,
            threads,
            yes,
            ..
        } => {
            assert_eq!(format.as_deref(), Some("hd"));
            assert_eq!(output_name.as_deref(), Some("My Clip"));
            assert_eq!(output_dir.as_deref(), Some(Path::new("/tmp/out")));
            assert_eq!(referer, "https://example.com/watch");
            assert_eq!(threads, Some(4));
            assert!(yes);
        }
        _ => panic!("expected Download with flags"),
    }
}

#[test]
fn cli_parse_download_long_flags() {
    match parse(&[
        "mdm",
        "download",
        "item.json",
        "--format",
        "default",
        "--output-name",
        "x",
        "--threads",
        "1",
        "--yes",
    ]) {
        CliCommand::Download {
            format,
            output_name,
            threads,
            yes,
            ..
        } => {
            assert_eq!(format.as_deref(), Some("default"));
            assert_eq!(output_name.as_deref(), Some("x"));
            assert_eq!(threads, Some(1));
            assert!(yes);
        }
        _ => panic!("expected Download with long flags"),
    }
}

#[test]
fn cli_parse_download_requires_item() {
    assert!(Cli::try_parse_from(["mdm", "download"]).is_err());
}

#[test]
fn cli_parse_download_rejects_bad_thread_count() {
    assert!(Cli::try_parse_from(["mdm", "download", "item.json", "-n", "many"]).is_err());
}
