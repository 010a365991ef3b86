//! Command line of the `ph` binary.
//!
//! `ph [project-file] [--option:value | --option]...`

use clap::Parser;
use std::collections::BTreeMap;

/// Option the binary consumes itself: path of the JSON chain report.
pub const REPORT_OPTION: &str = "report";

/// Option that lists the project's declared options instead of running it.
pub const HELP_OPTION: &str = "help";

#[derive(Parser, Debug)]
#[command(name = "ph")]
#[command(about = "Project Helper, a Cython project build system", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Project file (default: project.ph) followed by --option:value pairs
    #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Parsed invocation: which project file, which options.
#[derive(Debug, Default, PartialEq)]
pub struct Invocation {
    pub project_file: Option<String>,
    pub options: BTreeMap<String, String>,
}

impl Invocation {
    /// Options meant for the project script, reserved ones excluded.
    pub fn script_options(&self) -> impl Iterator<Item = (&String, &String)> {
        self.options.iter().filter(|(k, _)| k.as_str() != REPORT_OPTION)
    }

    pub fn wants_help(&self) -> bool {
        self.options.contains_key(HELP_OPTION)
    }

    pub fn report_path(&self) -> Option<&str> {
        self.options.get(REPORT_OPTION).map(String::as_str)
    }
}

/// Split raw tokens into the project file and `--name[:value]` options.
///
/// A bare `--name` means `on`. The value is everything after the first
/// `:`, so `--out:C:\dir` yields `C:\dir`. `-h` is `--help`. The last
/// positional token wins.
pub fn parse_args(args: &[String]) -> Invocation {
    let mut invocation = Invocation::default();
    for arg in args {
        match arg.strip_prefix("--") {
            Some("") => {}
            None if arg == "-h" => {
                invocation
                    .options
                    .insert(HELP_OPTION.to_string(), "on".to_string());
            }
            Some(option) => {
                let (name, value) = option.split_once(':').unwrap_or((option, "on"));
                invocation
                    .options
                    .insert(name.to_string(), value.to_string());
            }
            None => invocation.project_file = Some(arg.clone()),
        }
    }
    invocation
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_args(&[]), Invocation::default());
    }

    #[test]
    fn test_parse_options_and_file() {
        let inv = parse_args(&args(&["--build", "my.ph", "--mode:release", "--out:C:\\x"]));
        assert_eq!(inv.project_file.as_deref(), Some("my.ph"));
        assert_eq!(inv.options["build"], "on");
        assert_eq!(inv.options["mode"], "release");
        assert_eq!(inv.options["out"], "C:\\x");
    }

    #[test]
    fn test_empty_value_is_kept() {
        let inv = parse_args(&args(&["--name:"]));
        assert_eq!(inv.options["name"], "");
    }

    #[test]
    fn test_report_is_reserved() {
        let inv = parse_args(&args(&["--report:out.json"]));
        assert_eq!(inv.report_path(), Some("out.json"));
        assert_eq!(inv.script_options().count(), 0);
    }

    #[test]
    fn test_help_and_version_reach_the_project() {
        for flag in ["--help", "-h"] {
            let cli = Cli::try_parse_from(["ph", flag]).unwrap();
            assert_eq!(cli.args, vec![flag]);
            assert!(parse_args(&cli.args).wants_help());
        }

        let cli = Cli::try_parse_from(["ph", "--version", "my.ph"]).unwrap();
        let inv = parse_args(&cli.args);
        assert_eq!(inv.options["version"], "on");
        assert_eq!(inv.project_file.as_deref(), Some("my.ph"));
        assert!(!inv.wants_help());
    }

    #[test]
    fn test_clap_accepts_option_tokens() {
        let cli = Cli::try_parse_from(["ph", "--build", "--mode:fast"]).unwrap();
        assert_eq!(cli.args, vec!["--build", "--mode:fast"]);
    }
}
