//! Command-line definition

use amos_attack::{ATTACK_PATTERN, DEFAULT_PLATFORM};
use amos_build::ROOT_ENV;
use clap::{value_parser, Arg, ArgAction, ArgGroup, Command};
use std::path::PathBuf;

/// Dataset read when `--dataset` is not given
pub const DEFAULT_DATASET: &str = "enterprise-attack.json";

/// Techniques listed by `attack deps` by default
pub const DEFAULT_TOP: &str = "5";

/// The `amos` command tree
#[must_use]
pub fn command() -> Command {
    Command::new("amos")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Build shell scripts from YAML procedure definitions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("root")
                .long("root")
                .env(ROOT_ENV)
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Project root (defaults to the current directory)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("More logging: -v debug, -vv trace"),
        )
        .subcommand(
            Command::new("build")
                .about("Build one procedure or every pending procedure")
                .arg(
                    Arg::new("yaml")
                        .value_parser(value_parser!(PathBuf))
                        .help("Procedure YAML to build"),
                )
                .arg(
                    Arg::new("all")
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .help("Build every procedure without a script (all with --force)"),
                )
                .arg(
                    Arg::new("force")
                        .short('f')
                        .long("force")
                        .action(ArgAction::SetTrue)
                        .help("Overwrite existing scripts and bump the patch version"),
                )
                .group(ArgGroup::new("target").args(["yaml", "all"]).required(true)),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate a procedure YAML against the schema")
                .arg(
                    Arg::new("yaml")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Procedure YAML to validate"),
                ),
        )
        .subcommand(Command::new("sync-caldera").about("Sync built scripts to the Caldera plugin"))
        .subcommand(Command::new("sync-docs").about("Sync core function docs from the base template"))
        .subcommand(
            Command::new("convert-loobin")
                .about("Convert a LOOBins entry into a procedure YAML")
                .arg(
                    Arg::new("loobin")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("LOOBins YAML entry"),
                )
                .arg(
                    Arg::new("template")
                        .long("template")
                        .value_parser(value_parser!(PathBuf))
                        .help("Procedure template (defaults to the project template)"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_parser(value_parser!(PathBuf))
                        .help("Output file (defaults to <name>_procedure.yml)"),
                ),
        )
        .subcommand(
            Command::new("decrypt")
                .about("Decrypt script output")
                .arg(
                    Arg::new("method")
                        .short('m')
                        .long("method")
                        .default_value("auto")
                        .value_parser(["aes", "gpg", "xor", "auto"])
                        .help("Decryption method"),
                )
                .arg(
                    Arg::new("key")
                        .short('k')
                        .long("key")
                        .required_unless_present("interactive")
                        .help("Decryption key or passphrase"),
                )
                .arg(
                    Arg::new("data")
                        .short('d')
                        .long("data")
                        .required_unless_present_any(["file", "interactive"])
                        .help("Encrypted data"),
                )
                .arg(
                    Arg::new("file")
                        .short('f')
                        .long("file")
                        .conflicts_with("data")
                        .value_parser(value_parser!(PathBuf))
                        .help("File containing encrypted data"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Input is JSON output of a script"),
                )
                .arg(
                    Arg::new("interactive")
                        .short('i')
                        .long("interactive")
                        .action(ArgAction::SetTrue)
                        .help("Prompt for method, key and data"),
                ),
        )
        .subcommand(
            Command::new("attack")
                .about("MITRE ATT&CK reports")
                .subcommand_required(true)
                .arg(
                    Arg::new("dataset")
                        .long("dataset")
                        .global(true)
                        .default_value(DEFAULT_DATASET)
                        .value_parser(value_parser!(PathBuf))
                        .help("Enterprise ATT&CK STIX bundle"),
                )
                .subcommand(
                    Command::new("matrix")
                        .about("Coverage matrix of project procedures")
                        .arg(
                            Arg::new("platform")
                                .long("platform")
                                .default_value(DEFAULT_PLATFORM)
                                .help("Platform to render"),
                        )
                        .arg(
                            Arg::new("coverage")
                                .long("coverage")
                                .value_parser(value_parser!(PathBuf))
                                .help("TOML overlay with extra green/yellow techniques"),
                        ),
                )
                .subcommand(
                    Command::new("search")
                        .about("Search object descriptions")
                        .arg(Arg::new("term").required(true).help("Text to look for"))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .help(format!("STIX object type, e.g. {ATTACK_PATTERN}")),
                        )
                        .arg(
                            Arg::new("include-revoked")
                                .long("include-revoked")
                                .action(ArgAction::SetTrue)
                                .help("Keep revoked and deprecated objects"),
                        ),
                )
                .subcommand(
                    Command::new("deps")
                        .about("Techniques most depended on")
                        .arg(
                            Arg::new("top")
                                .long("top")
                                .default_value(DEFAULT_TOP)
                                .value_parser(value_parser!(usize))
                                .help("Number of techniques to list"),
                        ),
                )
                .subcommand(
                    Command::new("related")
                        .about("Techniques related to a technique")
                        .arg(Arg::new("technique").required(true).help("Technique id, e.g. T1078")),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        command().debug_assert();
    }

    #[test]
    fn build_needs_a_target() {
        assert!(command().try_get_matches_from(["amos", "build"]).is_err());
        assert!(command().try_get_matches_from(["amos", "build", "x.yml", "--all"]).is_err());
        let matches = command()
            .try_get_matches_from(["amos", "-vv", "build", "--all", "--force"])
            .unwrap();
        assert_eq!(matches.get_count("verbose"), 2);
        let (_, build) = matches.subcommand().unwrap();
        assert!(build.get_flag("all") && build.get_flag("force"));
    }

    #[test]
    fn decrypt_requires_key_and_input_unless_interactive() {
        assert!(command().try_get_matches_from(["amos", "decrypt", "--data", "x"]).is_err());
        assert!(command().try_get_matches_from(["amos", "decrypt", "-k", "k"]).is_err());
        assert!(command().try_get_matches_from(["amos", "decrypt", "-i"]).is_ok());
        assert!(command()
            .try_get_matches_from(["amos", "decrypt", "-k", "k", "-f", "a", "-d", "b"])
            .is_err());
    }

    #[test]
    fn dataset_is_global_to_attack() {
        let matches = command()
            .try_get_matches_from(["amos", "attack", "deps", "--dataset", "d.json", "--top", "3"])
            .unwrap();
        let (_, attack) = matches.subcommand().unwrap();
        let (_, deps) = attack.subcommand().unwrap();
        assert_eq!(deps.get_one::<PathBuf>("dataset"), Some(&PathBuf::from("d.json")));
        assert_eq!(deps.get_one::<usize>("top"), Some(&3));
    }
}
