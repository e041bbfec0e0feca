//! Subcommand handlers
//!
//! Each handler prints its report to stdout and returns whether the run
//! succeeded; errors that stop a command early come back as `anyhow`
//! errors with context.

mod attack;
mod build;
mod convert;
mod decrypt;
mod sync;

use amos_build::{Builder, ProjectLayout};
use amos_decrypt::Method;
use anyhow::Context;
use clap::ArgMatches;
use std::path::PathBuf;

fn open_layout(matches: &ArgMatches) -> anyhow::Result<ProjectLayout> {
    let root = ProjectLayout::resolve_root(matches.get_one::<PathBuf>("root").cloned())
        .context("failed to resolve project root")?;
    ProjectLayout::open(&root).with_context(|| format!("failed to open project at {}", root.display()))
}

fn builder(matches: &ArgMatches) -> anyhow::Result<Builder> {
    Builder::new(open_layout(matches)?).context("failed to prepare builder")
}

fn path_arg<'a>(matches: &'a ArgMatches, name: &str) -> anyhow::Result<&'a PathBuf> {
    matches
        .get_one::<PathBuf>(name)
        .with_context(|| format!("missing argument <{name}>"))
}

/// Run the selected subcommand
///
/// # Errors
/// Returns error when a command cannot start or stops early
pub async fn dispatch(matches: &ArgMatches) -> anyhow::Result<bool> {
    match matches.subcommand() {
        Some(("build", args)) => {
            let builder = builder(args)?;
            let force = args.get_flag("force");
            if args.get_flag("all") {
                build::build_all(&builder, force).await
            } else {
                Ok(build::build_one(&builder, path_arg(args, "yaml")?, force).await)
            }
        }
        Some(("validate", args)) => build::validate(&builder(args)?, path_arg(args, "yaml")?),
        Some(("sync-caldera", args)) => sync::sync_caldera(&open_layout(args)?),
        Some(("sync-docs", args)) => sync::sync_docs(&open_layout(args)?),
        Some(("convert-loobin", args)) => convert::convert_loobin(
            &open_layout(args)?,
            path_arg(args, "loobin")?,
            args.get_one::<PathBuf>("template"),
            args.get_one::<PathBuf>("output"),
        ),
        Some(("decrypt", args)) => {
            if args.get_flag("interactive") {
                return decrypt::interactive().await;
            }
            let method = args
                .get_one::<String>("method")
                .map_or(Ok(Method::Auto), |m| m.parse::<Method>())?;
            let key = args
                .get_one::<String>("key")
                .cloned()
                .context("--key is required")?;
            decrypt::decrypt(decrypt::DecryptArgs {
                method,
                key,
                data: args.get_one::<String>("data").cloned(),
                file: args.get_one::<PathBuf>("file").cloned(),
                json: args.get_flag("json"),
            })
            .await
        }
        Some(("attack", args)) => {
            let Some((name, sub)) = args.subcommand() else {
                anyhow::bail!("missing attack subcommand");
            };
            let dataset = path_arg(sub, "dataset")?;
            match name {
                "matrix" => attack::matrix(
                    &open_layout(sub)?,
                    dataset,
                    sub.get_one::<String>("platform").map_or("macOS", String::as_str),
                    sub.get_one::<PathBuf>("coverage").map(PathBuf::as_path),
                ),
                "search" => attack::search(
                    dataset,
                    sub.get_one::<String>("term").map_or("", String::as_str),
                    sub.get_one::<String>("type").map(String::as_str),
                    sub.get_flag("include-revoked"),
                ),
                "deps" => attack::deps(dataset, sub.get_one::<usize>("top").copied().unwrap_or(5)),
                "related" => attack::related(
                    dataset,
                    sub.get_one::<String>("technique").map_or("", String::as_str),
                ),
                other => anyhow::bail!("unknown attack subcommand: {other}"),
            }
        }
        Some((other, _)) => anyhow::bail!("unknown subcommand: {other}"),
        None => anyhow::bail!("no subcommand given"),
    }
}
