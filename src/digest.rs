//! Digest writing: render every input message in order and publish the
//! result atomically.
//!
//! Output goes to `<output>.tmp` first and is renamed onto `<output>` only
//! once every input has been processed, so readers never see a partial
//! digest.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::RenderConfig;
use crate::error::{Result, WoofError};
use crate::parser::mime::MimeParser;
use crate::render::message::render_message;

/// An input that was left out of the digest.
#[derive(Debug)]
pub struct SkippedInput {
    pub path: PathBuf,
    pub error: WoofError,
}

/// Outcome of one digest run.
#[derive(Debug, Default)]
pub struct DigestReport {
    /// Number of messages rendered into the digest.
    pub rendered: usize,
    /// Inputs that could not be read, in input order.
    pub skipped: Vec<SkippedInput>,
}

/// Renders message files into digest entries.
pub struct DigestWriter {
    parser: MimeParser,
    config: RenderConfig,
}

impl DigestWriter {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            parser: MimeParser::new(config.archive_header.clone()),
            config,
        }
    }

    /// Read and render a single message file.
    pub fn render_file(&self, path: &Path) -> Result<String> {
        let raw = std::fs::read(path).map_err(|e| WoofError::input(path, e))?;
        let message = self.parser.parse(&raw);
        Ok(render_message(&message, &self.config))
    }

    /// Render every input in order into `out`.
    ///
    /// Unreadable inputs are logged, recorded in the report and skipped.
    /// Only a failure to write `out` is returned as an error.
    pub fn write_entries<W: Write>(
        &self,
        inputs: &[PathBuf],
        out: &mut W,
        out_path: &Path,
    ) -> Result<DigestReport> {
        let mut report = DigestReport::default();

        for path in inputs {
            match self.render_file(path) {
                Ok(fragment) => {
                    out.write_all(fragment.as_bytes())
                        .map_err(|e| WoofError::io(out_path, e))?;
                    report.rendered += 1;
                    debug!(path = %path.display(), "Rendered message");
                }
                Err(error) => {
                    warn!(path = %path.display(), %error, "Skipping input");
                    report.skipped.push(SkippedInput {
                        path: path.clone(),
                        error,
                    });
                }
            }
        }

        Ok(report)
    }
}

/// Write the digest of `inputs` to `output`.
///
/// Missing parent directories are created first. The only fatal errors are
/// failing to open, write, or rename the temporary file.
pub fn write_digest(output: &Path, inputs: &[PathBuf], config: &RenderConfig) -> Result<DigestReport> {
    if let Err(e) = ensure_parent_dirs(output) {
        warn!(path = %output.display(), error = %e, "Could not create output directory");
    }

    let mut file = AtomicOutput::create(output)?;
    let writer = DigestWriter::new(config.clone());
    let temp = file.temp_path().to_path_buf();
    let report = writer.write_entries(inputs, &mut file, &temp)?;
    file.commit()?;

    info!(
        output = %output.display(),
        rendered = report.rendered,
        skipped = report.skipped.len(),
        "Digest written"
    );
    Ok(report)
}

/// Create every missing directory leading up to `path`.
///
/// New directories get mode `0777` (before umask) on Unix.
pub fn ensure_parent_dirs(path: &Path) -> Result<()> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if parent.is_dir() {
        return Ok(());
    }

    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o777);
    }
    builder
        .create(parent)
        .map_err(|e| WoofError::io(parent, e))
}

/// `<output>.tmp`, next to the output file.
pub fn temp_path_for(output: &Path) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// A file written under a temporary name and moved into place on
/// [`commit`](AtomicOutput::commit).
///
/// Dropping it without committing leaves the target path untouched.
pub struct AtomicOutput {
    target: PathBuf,
    temp: PathBuf,
    writer: BufWriter<File>,
}

impl AtomicOutput {
    /// Create (or truncate) `<target>.tmp` for writing.
    pub fn create(target: impl Into<PathBuf>) -> Result<Self> {
        let target = target.into();
        let temp = temp_path_for(&target);
        let file = File::create(&temp).map_err(|source| WoofError::OutputOpen {
            path: temp.clone(),
            source,
        })?;
        Ok(Self {
            target,
            temp,
            writer: BufWriter::new(file),
        })
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp
    }

    /// Flush the temporary file and rename it onto the target.
    pub fn commit(self) -> Result<PathBuf> {
        let Self {
            target,
            temp,
            writer,
        } = self;

        let file = writer
            .into_inner()
            .map_err(|e| WoofError::io(&temp, e.into_error()))?;
        file.sync_all().map_err(|e| WoofError::io(&temp, e))?;
        drop(file);

        std::fs::rename(&temp, &target).map_err(|source| WoofError::Rename {
            from: temp.clone(),
            to: target.clone(),
            source,
        })?;
        Ok(target)
    }
}

impl Write for AtomicOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}
