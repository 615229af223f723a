// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod check;
mod config;
mod logging;

use anyhow::{Context, Result};
use config::Config;
use std::env;
use std::path::PathBuf;
use taxgrid_api::{HttpGateway, MemoryGateway};
use taxgrid_app::{RecordGateway, Shell};

const DEMO_RECORDS: usize = 57;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `taxgrid --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    logging::init(&config.log_file()?, config.log_level())?;
    tracing::info!(
        config = %options.config_path.display(),
        demo = options.demo,
        "starting taxgrid"
    );

    if options.demo {
        let gateway = MemoryGateway::new(
            taxgrid_testkit::records(DEMO_RECORDS),
            taxgrid_testkit::countries(),
        );
        if options.check_only {
            println!("ok: demo mode, {DEMO_RECORDS} seeded records");
            return Ok(());
        }
        return launch(&gateway, config.page_size());
    }

    let gateway = HttpGateway::new(
        config.records_url(),
        config.countries_url(),
        config.api_timeout()?,
    )
    .with_context(|| {
        format!(
            "invalid [api] config in {}; fix records_url/countries_url/timeout values",
            options.config_path.display()
        )
    })?;
    if options.check_only {
        let report = check::probe(&gateway)?;
        println!("{report}");
        return Ok(());
    }

    launch(&gateway, config.page_size())
}

fn launch<G>(gateway: &G, page_size: usize) -> Result<()>
where
    G: RecordGateway + Clone + Send + Sync + 'static,
{
    let mut shell = Shell::default();
    let result = taxgrid_tui::run_app(&mut shell, gateway, page_size);
    tracing::info!(records = shell.records.len(), "taxgrid exiting");
    result
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    demo: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        demo: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => options.print_config_path = true,
            "--print-example-config" => options.print_example = true,
            "--demo" => options.demo = true,
            "--check" => options.check_only = true,
            "--help" | "-h" => options.show_help = true,
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("taxgrid: browse and edit tax records");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Run against seeded in-memory records, no network");
    println!("  --check                  Validate config and probe both API endpoints");
    println!("  --help                   Show this help");
    println!();
    println!("Environment: TAXGRID_CONFIG_PATH overrides the config path,");
    println!("TAXGRID_LOG overrides [log].level.");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args};
    use anyhow::Result;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/taxgrid-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_example: false,
                demo: false,
                check_only: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/taxgrid.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/taxgrid.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_config_value() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--page-size"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_demo_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--demo", "--check", "--print-example-config"],
            default_options_path(),
        )?;
        assert!(options.demo);
        assert!(options.check_only);
        assert!(options.print_example);
        assert!(!options.print_config_path);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        assert!(parse_cli_args(vec!["--help"], default_options_path())?.show_help);
        assert!(parse_cli_args(vec!["-h"], default_options_path())?.show_help);
        Ok(())
    }
}
