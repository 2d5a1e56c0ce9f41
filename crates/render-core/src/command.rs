//! A renderer that hands the layout tree to an external program.
//!
//! The tree and stylesheet are written as JSON into a private scratch
//! directory, the program is started with `{input}` and `{output}` replaced
//! by the paths of that file and of the expected PDF, and the PDF is read back
//! once the program exits successfully. The child is killed when the render is
//! cancelled or its deadline passes. The scratch directory is removed on every
//! path, including panics, because it is owned by a `TempDir`.

use crate::context::RenderContext;
use crate::error::RenderError;
use crate::traits::{DocumentRenderer, RenderedDocument};
use serde::{Deserialize, Serialize};
use specsheet_idf::LayoutTree;
use specsheet_style::Stylesheet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

const INPUT_PLACEHOLDER: &str = "{input}";
const OUTPUT_PLACEHOLDER: &str = "{output}";
const INPUT_FILE: &str = "document.json";
const OUTPUT_FILE: &str = "document.pdf";
const STDERR_FILE: &str = "stderr.log";
/// Upper bound on how much of the child's stderr ends up in an error message.
const STDERR_EXCERPT: usize = 512;

/// The program to run and its argument template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// The argument list with both placeholders substituted.
    pub fn resolve_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(INPUT_PLACEHOLDER, &input)
                    .replace(OUTPUT_PLACEHOLDER, &output)
            })
            .collect()
    }
}

#[derive(Serialize)]
struct RenderJob<'a> {
    stylesheet: &'a Stylesheet,
    tree: &'a LayoutTree,
}

fn write_job(path: &Path, job: &RenderJob<'_>) -> Result<(), RenderError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, job)?;
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct CommandRenderer {
    spec: CommandSpec,
    poll_interval: Duration,
    scratch_root: Option<PathBuf>,
}

impl CommandRenderer {
    pub fn new(spec: CommandSpec) -> Self {
        Self {
            spec,
            poll_interval: Duration::from_millis(20),
            scratch_root: None,
        }
    }

    /// Create scratch directories under `root` instead of the system temp dir.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    fn scratch_dir(&self) -> Result<tempfile::TempDir, RenderError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("specsheet-render-");
        let dir = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        Ok(dir)
    }

    /// Wait for the child, killing it if the context fires first.
    fn supervise(&self, child: &mut Child, ctx: &RenderContext) -> Result<ExitStatus, RenderError> {
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if let Err(interrupted) = ctx.checkpoint() {
                log::warn!(
                    "Stopping external renderer '{}' (pid {}): {}",
                    self.spec.program,
                    child.id(),
                    interrupted
                );
                // The child may exit between try_wait and kill.
                let _ = child.kill();
                let _ = child.wait();
                return Err(interrupted);
            }
            let nap = ctx
                .remaining()
                .map_or(self.poll_interval, |left| left.min(self.poll_interval));
            thread::sleep(nap.max(Duration::from_millis(1)));
        }
    }
}

fn stderr_excerpt(path: &Path) -> String {
    let text = fs::read_to_string(path).unwrap_or_default();
    let text = text.trim();
    match text.char_indices().nth(STDERR_EXCERPT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

impl DocumentRenderer for CommandRenderer {
    fn render(
        &self,
        tree: &LayoutTree,
        stylesheet: &Stylesheet,
        ctx: &RenderContext,
    ) -> Result<RenderedDocument, RenderError> {
        ctx.checkpoint()?;

        let scratch = self.scratch_dir()?;
        let input = scratch.path().join(INPUT_FILE);
        let output = scratch.path().join(OUTPUT_FILE);
        let stderr_path = scratch.path().join(STDERR_FILE);

        write_job(&input, &RenderJob { stylesheet, tree })?;

        let args = self.spec.resolve_args(&input, &output);
        log::debug!("Starting external renderer: {} {:?}", self.spec.program, args);
        let mut child = Command::new(&self.spec.program)
            .args(&args)
            .current_dir(scratch.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(File::create(&stderr_path)?))
            .spawn()
            .map_err(|e| {
                RenderError::Process(format!("could not start '{}': {}", self.spec.program, e))
            })?;

        let status = self.supervise(&mut child, ctx)?;
        if !status.success() {
            let detail = stderr_excerpt(&stderr_path);
            return Err(RenderError::Process(if detail.is_empty() {
                format!("'{}' exited with {}", self.spec.program, status)
            } else {
                format!("'{}' exited with {}: {}", self.spec.program, status, detail)
            }));
        }

        let bytes = fs::read(&output).map_err(|e| {
            RenderError::Process(format!(
                "'{}' produced no output at {}: {}",
                self.spec.program,
                output.display(),
                e
            ))
        })?;
        if bytes.is_empty() {
            return Err(RenderError::Process(format!(
                "'{}' produced an empty document",
                self.spec.program
            )));
        }
        Ok(RenderedDocument::new(bytes, None))
    }

    fn name(&self) -> &'static str {
        "CommandRenderer"
    }
}
