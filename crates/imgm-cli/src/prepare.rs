//! Validate command-line paths and open the streams for a merge run.
//!
//! Every check runs before any file is created, so a rejected invocation
//! leaves the filesystem untouched.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use imgm_merge::{InputSource, MergeError, MergeSession};
use imgm_types::SECTOR_SIZE;

/// Buffer capacity for every input and output stream.
pub const STREAM_BUFFER: usize = 64 * 1024;

pub type FileSession = MergeSession<BufReader<File>, BufWriter<File>, BufWriter<File>>;

#[derive(Debug, thiserror::Error)]
pub enum PrepareError {
    #[error("at least two input files are required, got {0}")]
    TooFewInputs(usize),

    #[error("output directory does not exist: {}", .0.display())]
    OutputDirMissing(PathBuf),

    #[error("output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("log file already exists: {}", .0.display())]
    LogExists(PathBuf),

    #[error("input file does not exist: {}", .0.display())]
    InputMissing(PathBuf),

    #[error("{} is {len} bytes, not a multiple of 512", .path.display())]
    NotSectorAligned { path: PathBuf, len: u64 },

    #[error("{} is {actual} bytes, expected {expected} like {}", .path.display(), .first.display())]
    LengthMismatch {
        path: PathBuf,
        first: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("{}: {error}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: io::Error,
    },

    #[error(transparent)]
    Session(#[from] MergeError),
}

/// Streams opened and ready to merge.
pub struct PreparedRun {
    pub session: FileSession,
    pub output_path: PathBuf,
    pub log_path: PathBuf,
}

/// `<output>.log`, appended rather than replacing any extension.
pub fn default_log_path(output: &Path) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(".log");
    PathBuf::from(name)
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> PrepareError + '_ {
    move |error| PrepareError::Io {
        path: path.to_path_buf(),
        error,
    }
}

/// Run the preflight checks and open every stream.
pub fn prepare(
    output: &Path,
    inputs: &[PathBuf],
    log: Option<&Path>,
) -> Result<PreparedRun, PrepareError> {
    if inputs.len() < 2 {
        return Err(PrepareError::TooFewInputs(inputs.len()));
    }

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        return Err(PrepareError::OutputDirMissing(dir.to_path_buf()));
    }

    let log_path = log.map_or_else(|| default_log_path(output), Path::to_path_buf);
    if output.exists() {
        return Err(PrepareError::OutputExists(output.to_path_buf()));
    }
    if log_path.exists() {
        return Err(PrepareError::LogExists(log_path));
    }

    let mut lengths = Vec::with_capacity(inputs.len());
    for path in inputs {
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PrepareError::InputMissing(path.clone()))
            }
            Err(e) => return Err(io_error(path)(e)),
        };
        lengths.push(meta.len());
    }

    for (path, &len) in inputs.iter().zip(&lengths) {
        if len % SECTOR_SIZE as u64 != 0 {
            return Err(PrepareError::NotSectorAligned {
                path: path.clone(),
                len,
            });
        }
    }

    let expected = lengths[0];
    for (path, &actual) in inputs.iter().zip(&lengths).skip(1) {
        if actual != expected {
            return Err(PrepareError::LengthMismatch {
                path: path.clone(),
                first: inputs[0].clone(),
                expected,
                actual,
            });
        }
    }

    let mut sources = Vec::with_capacity(inputs.len());
    for path in inputs {
        let file = File::open(path).map_err(io_error(path))?;
        sources.push(InputSource::new(
            path.display().to_string(),
            BufReader::with_capacity(STREAM_BUFFER, file),
        ));
    }

    let out = create_new(output)?;
    let log_file = create_new(&log_path)?;
    let session = MergeSession::new(sources, out, log_file, expected)?;

    tracing::debug!(
        output = %output.display(),
        log = %log_path.display(),
        inputs = inputs.len(),
        bytes = expected,
        "streams opened"
    );

    Ok(PreparedRun {
        session,
        output_path: output.to_path_buf(),
        log_path,
    })
}

fn create_new(path: &Path) -> Result<BufWriter<File>, PrepareError> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(io_error(path))?;
    Ok(BufWriter::with_capacity(STREAM_BUFFER, file))
}
