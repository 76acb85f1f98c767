use crate::CLAP_STYLING;
use clap::{ArgAction, arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitelens")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitelens")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Increase log verbosity (-v info, -vv debug)")
                .required(false)
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Initializes the sitelens report database on your filesystem")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Location to store the sitelens database")
                        .default_value("~/.config/sitelens/"),
                )
                .arg(
                    arg!(-f --"force")
                        .help("Replace any existing database at the specified location.")
                        .required(false),
                ),
        )
        .subcommand(
            command!("analyze")
                .about("Analyze a website and/or business listing and print a composite report")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("The website to analyze (a bare host gets https://)")
                        .conflicts_with("hosts-file"),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of websites to analyze")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with("url"),
                )
                .arg(
                    arg!(-b --"business-name" <NAME>)
                        .required(false)
                        .help("Business name used for the maps listing lookup"),
                )
                .arg(
                    arg!(--"category" <CATEGORY>)
                        .required(false)
                        .help("Business category, e.g. bakery (business-only targets)"),
                )
                .arg(
                    arg!(--"region" <REGION>)
                        .required(false)
                        .help("Business region or city (business-only targets)"),
                )
                .arg(
                    arg!(-p --"profile" <PROFILE>)
                        .required(false)
                        .help("Analysis profile")
                        .value_parser(["full", "seo", "performance", "competitors", "business"])
                        .ignore_case(true)
                        .default_value("full"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, markdown")
                        .value_parser(["text", "json", "markdown", "md"])
                        .ignore_case(true)
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-s --"save" <DB>)
                        .required(false)
                        .help("Store the report in a sitelens database (see `sitelens init`)"),
                )
                .arg(
                    arg!(-t --"workers" <NUM_WORKERS>)
                        .required(false)
                        .help("Maximum number of analyzers running at once")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("5"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Per-analyzer timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("30"),
                )
                .arg(
                    arg!(--"pagespeed-key" <KEY>)
                        .required(false)
                        .help("PageSpeed Insights API key")
                        .env("SITELENS_PAGESPEED_KEY")
                        .hide_env_values(true),
                )
                .arg(
                    arg!(--"pagespeed-endpoint" <URL>)
                        .required(false)
                        .help("Override the PageSpeed Insights endpoint"),
                )
                .arg(
                    arg!(--"places-key" <KEY>)
                        .required(false)
                        .help("Places API key for business listing lookups")
                        .env("SITELENS_PLACES_KEY")
                        .hide_env_values(true),
                )
                .arg(
                    arg!(--"places-endpoint" <URL>)
                        .required(false)
                        .help("Override the Places API endpoint"),
                )
                .arg(
                    arg!(--"ai-key" <KEY>)
                        .required(false)
                        .help("API key for the AI insight provider")
                        .env("SITELENS_AI_KEY")
                        .hide_env_values(true),
                )
                .arg(
                    arg!(--"ai-endpoint" <URL>)
                        .required(false)
                        .help("OpenAI-compatible API base URL")
                        .env("SITELENS_AI_ENDPOINT"),
                )
                .arg(
                    arg!(--"ai-model" <MODEL>)
                        .required(false)
                        .help("Model used for AI insight")
                        .env("SITELENS_AI_MODEL"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitelens_core::orchestrator::{DEFAULT_TIMEOUT, DEFAULT_WORKER_LIMIT};

    #[test]
    fn test_command_definition_is_valid() {
        command_argument_builder().debug_assert();
    }

    #[test]
    fn test_analyze_defaults() {
        let matches = command_argument_builder()
            .try_get_matches_from(["sitelens", "analyze", "--url", "example.com"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "analyze");
        assert_eq!(sub.get_one::<String>("profile").unwrap(), "full");
        assert_eq!(sub.get_one::<String>("format").unwrap(), "text");
        assert_eq!(*sub.get_one::<usize>("workers").unwrap(), DEFAULT_WORKER_LIMIT);
        assert_eq!(*sub.get_one::<u64>("timeout").unwrap(), DEFAULT_TIMEOUT.as_secs());
    }

    #[test]
    fn test_url_conflicts_with_hosts_file() {
        let result = command_argument_builder().try_get_matches_from([
            "sitelens",
            "analyze",
            "--url",
            "example.com",
            "--hosts-file",
            "hosts.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_profile_rejected() {
        let result = command_argument_builder().try_get_matches_from([
            "sitelens",
            "analyze",
            "--url",
            "example.com",
            "--profile",
            "social",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbose_counts() {
        let matches = command_argument_builder()
            .try_get_matches_from(["sitelens", "-vv"])
            .unwrap();
        assert_eq!(matches.get_count("verbose"), 2);
    }
}
