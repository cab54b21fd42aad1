//! # Thumbnail Generation
//!
//! Image items get a small JPEG preview rendered by an external tool (ffmpeg by
//! default). The same invocation also handles a video source by grabbing its
//! first frame.
//!
//! ## Failure Is an Outcome
//!
//! [`Thumbnailer::generate`] never returns an error. Every failure (tool not
//! installed, unsupported codec, non-zero exit, timeout, full disk) is reported
//! as [`ThumbnailOutcome::Unavailable`] and the caller simply leaves the item
//! without a thumbnail.
//!
//! ## No Partial Files
//!
//! The tool never writes to the destination directly. It renders into a hidden
//! temp file next to the destination, and only a successful, non-empty render is
//! renamed into place:
//!
//! ```text
//! thumbs/.<uuid>.tmp.jpg  --(exit 0, len > 0)-->  thumbs/<id>_thumb.jpg
//!                         --(anything else)---->  removed
//! ```
//!
//! The temp name keeps the `.jpg` extension because ffmpeg picks the output
//! format from it.
//!
//! On unix the tool runs as the leader of its own process group. A timeout kills
//! the whole group, so helpers started by a wrapper script cannot write into
//! `thumbs/` after the temp file has been cleaned up.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_PROGRAM: &str = "ffmpeg";
pub const DEFAULT_WIDTH: u32 = 160;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailOutcome {
    /// The destination file now exists and holds a complete JPEG.
    Generated,
    /// No thumbnail was produced. The reason is for logs only.
    Unavailable(String),
}

impl ThumbnailOutcome {
    pub fn is_generated(&self) -> bool {
        matches!(self, ThumbnailOutcome::Generated)
    }
}

/// Derives a preview image at `dest` from the image at `source`.
pub trait Thumbnailer {
    fn generate(&self, source: &Path, dest: &Path) -> ThumbnailOutcome;
}

/// Runs an ffmpeg-compatible program:
/// `<program> -nostdin -y -i <source> -vf scale=<width>:-1 -vframes 1 <dest>`.
#[derive(Debug, Clone)]
pub struct ExternalThumbnailer {
    program: PathBuf,
    width: u32,
    timeout: Duration,
}

impl Default for ExternalThumbnailer {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl ExternalThumbnailer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            width: DEFAULT_WIDTH,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// An empty program path disables generation.
    pub fn is_enabled(&self) -> bool {
        !self.program.as_os_str().is_empty()
    }

    fn args(&self, source: &Path, output: &Path) -> Vec<OsString> {
        vec![
            "-nostdin".into(),
            "-y".into(),
            "-i".into(),
            source.into(),
            "-vf".into(),
            format!("scale={}:-1", self.width).into(),
            "-vframes".into(),
            "1".into(),
            output.into(),
        ]
    }

    fn render(&self, source: &Path, output: &Path) -> Result<(), String> {
        debug!(program = %self.program.display(), source = %source.display(), "running thumbnail tool");
        let mut command = Command::new(&self.program);
        command
            .args(self.args(source, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        let mut child = command
            .spawn()
            .map_err(|e| format!("failed to spawn {}: {}", self.program.display(), e))?;

        let status = wait_with_timeout(&mut child, self.timeout)?;
        if !status.success() {
            return Err(format!("{} exited with {}", self.program.display(), status));
        }
        Ok(())
    }
}

impl Thumbnailer for ExternalThumbnailer {
    fn generate(&self, source: &Path, dest: &Path) -> ThumbnailOutcome {
        if !self.is_enabled() {
            return ThumbnailOutcome::Unavailable("thumbnail generation is disabled".to_string());
        }
        let Some(dir) = dest.parent() else {
            return ThumbnailOutcome::Unavailable(format!(
                "{} has no parent directory",
                dest.display()
            ));
        };

        let tmp = dir.join(format!(".{}.tmp.jpg", Uuid::new_v4().simple()));
        match self
            .render(source, &tmp)
            .and_then(|()| promote(&tmp, dest))
        {
            Ok(()) => {
                debug!(dest = %dest.display(), "thumbnail written");
                ThumbnailOutcome::Generated
            }
            Err(reason) => {
                let _ = fs::remove_file(&tmp);
                ThumbnailOutcome::Unavailable(reason)
            }
        }
    }
}

/// Never produces a thumbnail.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoThumbnails;

impl Thumbnailer for NoThumbnails {
    fn generate(&self, _source: &Path, _dest: &Path) -> ThumbnailOutcome {
        ThumbnailOutcome::Unavailable("thumbnail generation is disabled".to_string())
    }
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<ExitStatus, String> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if Instant::now() >= deadline => {
                kill_tool(child);
                let _ = child.wait();
                return Err(format!("timed out after {:?}", timeout));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(format!("failed to wait for thumbnail tool: {}", e)),
        }
    }
}

#[cfg(unix)]
fn kill_tool(child: &mut Child) {
    if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
        // SAFETY: killpg only sends a signal. The group was created for this child.
        unsafe {
            libc::killpg(pgid, libc::SIGKILL);
        }
    }
    let _ = child.kill();
}

#[cfg(not(unix))]
fn kill_tool(child: &mut Child) {
    let _ = child.kill();
}

/// Move a finished render into place, refusing missing or empty output.
fn promote(tmp: &Path, dest: &Path) -> Result<(), String> {
    let len = fs::metadata(tmp)
        .map(|meta| meta.len())
        .map_err(|_| "thumbnail tool produced no output".to_string())?;
    if len == 0 {
        return Err("thumbnail tool produced an empty file".to_string());
    }
    fs::rename(tmp, dest).map_err(|e| format!("failed to move thumbnail into place: {}", e))
}
