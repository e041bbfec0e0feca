//! Procedure build pipeline
//!
//! `build` runs one procedure through load, validate, render, write,
//! check, stamp and test-script generation. A script that fails its
//! checks is removed so the tree never holds a broken build.

use crate::check::ShellChecker;
use crate::config::ProjectLayout;
use crate::error::{BuildError, BuildResult};
use crate::output::{select_output, Disposition};
use crate::stamp::{Stamp, Stamper};
use amos_codegen::{test_script, BaseTemplate, RenderOptions, ScriptRenderer};
use amos_procedure::{bump_patch, ProcedureSchema, ProcedureSource, ValidationReport};
use std::path::{Component, Path, PathBuf};
use tracing::{error, info, warn};

/// Mode bits for generated scripts
pub const SCRIPT_MODE: u32 = 0o755;

/// Result of one successful build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Source YAML
    pub yaml_path: PathBuf,
    /// Written script
    pub script_path: PathBuf,
    /// How the script path was chosen
    pub disposition: Disposition,
    /// Whether shellcheck ran in addition to `sh -n`
    pub shellcheck: bool,
    /// Stamp applied, `None` when stamping failed
    pub stamp: Option<Stamp>,
    /// `(old, new)` version on force rebuilds
    pub version_bump: Option<(String, String)>,
    /// Generated smoke-test script
    pub test_script: Option<PathBuf>,
}

/// Result of a batch build
#[derive(Debug, Default)]
pub struct BuildSummary {
    /// Successful builds
    pub built: Vec<BuildOutcome>,
    /// Failed YAML files with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl BuildSummary {
    /// True when nothing failed
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Builds procedure scripts for one project
#[derive(Debug)]
pub struct Builder {
    layout: ProjectLayout,
    renderer: ScriptRenderer,
    schema: ProcedureSchema,
    checker: ShellChecker,
}

impl Builder {
    /// Builder for `layout`, loading the base template and schema from
    /// the project or falling back to the bundled copies
    ///
    /// # Errors
    /// Returns error if a present template or schema file is unreadable
    pub fn new(layout: ProjectLayout) -> BuildResult<Self> {
        let template = BaseTemplate::load_or_embedded(layout.base_template())?;
        let missing = template.missing_markers();
        if !missing.is_empty() {
            warn!(?missing, "base template is missing markers");
        }

        let schema_path = layout.schema();
        let schema = if schema_path.exists() {
            ProcedureSchema::from_path(&schema_path)?
        } else {
            tracing::debug!(path = %schema_path.display(), "schema not found, using embedded copy");
            ProcedureSchema::embedded()?
        };

        let checker = ShellChecker::new(&layout.config().build);
        Ok(Self {
            layout,
            renderer: ScriptRenderer::new(template),
            schema,
            checker,
        })
    }

    /// Project layout
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Validate a procedure YAML against the schema
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn validate(&self, path: impl AsRef<Path>) -> BuildResult<ValidationReport> {
        let source = ProcedureSource::load(path)?;
        Ok(self.schema.validate(source.value()))
    }

    /// Build one procedure
    ///
    /// # Errors
    /// Returns error on invalid YAML, failed checks or IO failures
    pub async fn build(&self, path: impl AsRef<Path>, force: bool) -> BuildResult<BuildOutcome> {
        let yaml_path = path.as_ref();
        let source = ProcedureSource::load(yaml_path)?;
        let report = self.schema.validate(source.value());
        if !report.is_valid() {
            return Err(BuildError::Validation {
                path: yaml_path.to_path_buf(),
                report,
            });
        }
        let procedure = source.to_procedure()?;

        let stamp = Stamp::generate();
        let mut options = RenderOptions::default().with_project_root(self.layout.root().display().to_string());
        let version_bump = force.then(|| {
            let old = procedure.version().to_string();
            let new = bump_patch(&old);
            (old, new)
        });
        if let Some((old, new)) = &version_bump {
            info!(procedure = procedure.name(), "force rebuild: version {old} -> {new}, date {}", stamp.date);
            options = options.with_version(new.clone()).with_updated(stamp.date.clone());
        }
        let script = self.renderer.render(&procedure, &options);

        let dir = self.layout.output_dir(&procedure.tactic());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| BuildError::io_error(&dir, e))?;
        let choice = select_output(&dir, procedure.name(), force);
        info!(script = %choice.path.display(), disposition = %choice.disposition, "writing script");
        write_executable(&choice.path, &script).await?;

        let outcome = self.checker.check(&choice.path).await;
        if !outcome.is_passed() {
            error!(script = %choice.path.display(), %outcome, "build failed, removing script");
            tokio::fs::remove_file(&choice.path)
                .await
                .map_err(|e| BuildError::io_error(&choice.path, e))?;
            return Err(BuildError::CheckFailed {
                path: choice.path,
                outcome,
            });
        }
        let shellcheck = matches!(outcome, crate::check::CheckOutcome::Passed { shellcheck: true });

        let stamper = Stamper::new(stamp);
        let bumped = version_bump.as_ref().map(|(_, new)| new.as_str());
        let stamp = match stamper.apply(yaml_path, &choice.path, bumped).await {
            Ok(()) => Some(stamper.stamp().clone()),
            Err(e) => {
                warn!(error = %e, "stamping failed, script is still usable");
                None
            }
        };

        let test_script = if self.layout.config().build.generate_tests {
            Some(self.write_test_script(&choice.path, &procedure).await?)
        } else {
            None
        };

        info!(script = %choice.path.display(), "build succeeded");
        Ok(BuildOutcome {
            yaml_path: yaml_path.to_path_buf(),
            script_path: choice.path,
            disposition: choice.disposition,
            shellcheck,
            stamp,
            version_bump,
            test_script,
        })
    }

    async fn write_test_script(&self, script: &Path, procedure: &amos_procedure::Procedure) -> BuildResult<PathBuf> {
        let dir = self.layout.test_scripts_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| BuildError::io_error(&dir, e))?;

        let stem = script.file_stem().map_or_else(String::new, |s| s.to_string_lossy().into_owned());
        let path = dir.join(format!("test_{stem}.sh"));
        let script_ref = relative_path(&dir, script);
        write_executable(&path, &test_script(&script_ref.to_string_lossy(), procedure)).await?;
        info!(test = %path.display(), "test script created");
        Ok(path)
    }

    /// Procedure YAMLs whose script has not been built yet
    ///
    /// # Errors
    /// Returns error if the config directory cannot be listed
    pub fn pending(&self) -> BuildResult<Vec<PathBuf>> {
        let mut pending = Vec::new();
        for path in self.layout.procedure_files()? {
            let procedure = match ProcedureSource::load(&path) {
                Ok(source) if source.procedure_name().is_none() => continue,
                Ok(source) => source.to_procedure(),
                Err(e) => Err(e),
            };
            match procedure {
                Ok(procedure) if !self.layout.script_path(&procedure).exists() => pending.push(path),
                Ok(_) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable procedure"),
            }
        }
        Ok(pending)
    }

    /// Every procedure YAML with a `procedure_name`
    ///
    /// # Errors
    /// Returns error if the config directory cannot be listed
    pub fn all_procedures(&self) -> BuildResult<Vec<PathBuf>> {
        let mut all = Vec::new();
        for path in self.layout.procedure_files()? {
            match ProcedureSource::load(&path) {
                Ok(source) if source.procedure_name().is_some() => all.push(path),
                Ok(_) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable procedure"),
            }
        }
        Ok(all)
    }

    /// Build pending procedures, or every procedure with `force`
    ///
    /// # Errors
    /// Returns error if the config directory cannot be listed; individual
    /// build failures are collected in the summary
    pub async fn build_all(&self, force: bool) -> BuildResult<BuildSummary> {
        let targets = if force { self.all_procedures()? } else { self.pending()? };
        info!(count = targets.len(), "procedures to build");

        let mut summary = BuildSummary::default();
        for path in targets {
            match self.build(&path, force).await {
                Ok(outcome) => summary.built.push(outcome),
                Err(e) => {
                    error!(path = %path.display(), error = %e, "build failed");
                    summary.failed.push((path, e.to_string()));
                }
            }
        }
        Ok(summary)
    }
}

async fn write_executable(path: &Path, content: &str) -> BuildResult<()> {
    tokio::fs::write(path, content)
        .await
        .map_err(|e| BuildError::io_error(path, e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(SCRIPT_MODE))
            .await
            .map_err(|e| BuildError::io_error(path, e))?;
    }
    Ok(())
}

/// Path to `target` as seen from directory `from`
fn relative_path(from: &Path, target: &Path) -> PathBuf {
    let from: Vec<Component<'_>> = from.components().collect();
    let target: Vec<Component<'_>> = target.components().collect();
    let common = from.iter().zip(&target).take_while(|(a, b)| a == b).count();

    let mut rel = PathBuf::new();
    for _ in common..from.len() {
        rel.push("..");
    }
    for component in &target[common..] {
        rel.push(component.as_os_str());
    }
    rel
}
