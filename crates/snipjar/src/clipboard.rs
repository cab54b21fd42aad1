//! System clipboard access through the platform's command line tools.
//!
//! - macOS: `pbcopy`/`pbpaste` for text, `osascript` and `pngpaste` for images
//! - Linux: `wl-copy`/`wl-paste` on Wayland, `xclip` or `xsel` on X11
//! - Windows: `clip` and `powershell`
//!
//! Every operation tries its candidate tools in order and uses the first one
//! that is installed and succeeds.

use anyhow::{anyhow, Context, Result};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// One way of talking to the clipboard: a program and its arguments.
#[derive(Debug, Clone)]
pub struct Tool {
    pub program: String,
    pub args: Vec<String>,
}

impl Tool {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

pub fn copy_text(text: &str) -> Result<()> {
    write_clipboard(&copy_text_tools(), text.as_bytes())
}

/// Put the image stored at `path` on the clipboard.
pub fn copy_image(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        let script = format!(
            "set the clipboard to (read (POSIX file {}) as «class PNGf»)",
            applescript_string(path)
        );
        write_clipboard(&[Tool::new("osascript", &["-e", &script])], &[])
    }

    #[cfg(target_os = "windows")]
    {
        let script = format!(
            "Add-Type -AssemblyName System.Windows.Forms; Add-Type -AssemblyName System.Drawing; \
             [System.Windows.Forms.Clipboard]::SetImage([System.Drawing.Image]::FromFile({}))",
            powershell_string(path)
        );
        write_clipboard(&[Tool::new("powershell", &["-sta", "-command", &script])], &[])
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        write_clipboard(&copy_image_tools(), &bytes)
    }
}

/// `path` as a double-quoted AppleScript string literal.
#[cfg(any(target_os = "macos", test))]
fn applescript_string(path: &Path) -> String {
    let raw = path.display().to_string();
    format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
}

/// `path` as a single-quoted PowerShell string literal.
#[cfg(any(target_os = "windows", test))]
fn powershell_string(path: &Path) -> String {
    format!("'{}'", path.display().to_string().replace('\'', "''"))
}

/// Text on the clipboard, or `None` when it holds no text.
pub fn paste_text() -> Result<Option<String>> {
    match read_clipboard(&paste_text_tools())? {
        Some(bytes) => String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| anyhow!("Invalid UTF-8 in clipboard: {}", e)),
        None => Ok(None),
    }
}

/// PNG image on the clipboard, or `None` when it holds no image.
pub fn paste_image() -> Result<Option<Vec<u8>>> {
    read_clipboard(&paste_image_tools())
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn wayland() -> bool {
    std::env::var_os("WAYLAND_DISPLAY").is_some_and(|v| !v.is_empty())
}

/// Wayland tools first when a Wayland session is running, X11 tools first otherwise.
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn linux_order(wl: Vec<Tool>, x11: Vec<Tool>) -> Vec<Tool> {
    if wayland() {
        wl.into_iter().chain(x11).collect()
    } else {
        x11.into_iter().chain(wl).collect()
    }
}

fn copy_text_tools() -> Vec<Tool> {
    #[cfg(target_os = "macos")]
    {
        vec![Tool::new("pbcopy", &[])]
    }
    #[cfg(target_os = "windows")]
    {
        vec![Tool::new("clip", &[])]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        linux_order(
            vec![Tool::new("wl-copy", &[])],
            vec![
                Tool::new("xclip", &["-selection", "clipboard"]),
                Tool::new("xsel", &["--clipboard", "--input"]),
            ],
        )
    }
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn copy_image_tools() -> Vec<Tool> {
    linux_order(
        vec![Tool::new("wl-copy", &["--type", "image/png"])],
        vec![Tool::new(
            "xclip",
            &["-selection", "clipboard", "-t", "image/png"],
        )],
    )
}

fn paste_text_tools() -> Vec<Tool> {
    #[cfg(target_os = "macos")]
    {
        vec![Tool::new("pbpaste", &[])]
    }
    #[cfg(target_os = "windows")]
    {
        vec![Tool::new("powershell", &["-command", "Get-Clipboard -Raw"])]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        linux_order(
            vec![Tool::new("wl-paste", &["--no-newline", "--type", "text/plain"])],
            vec![
                Tool::new("xclip", &["-selection", "clipboard", "-o"]),
                Tool::new("xsel", &["--clipboard", "--output"]),
            ],
        )
    }
}

fn paste_image_tools() -> Vec<Tool> {
    #[cfg(target_os = "macos")]
    {
        vec![Tool::new("pngpaste", &["-"])]
    }
    #[cfg(target_os = "windows")]
    {
        vec![Tool::new(
            "powershell",
            &[
                "-sta",
                "-command",
                "$i = Get-Clipboard -Format Image; if ($i) { $m = New-Object System.IO.MemoryStream; \
                 $i.Save($m, [System.Drawing.Imaging.ImageFormat]::Png); \
                 $o = [Console]::OpenStandardOutput(); $o.Write($m.ToArray(), 0, $m.Length) }",
            ],
        )]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        linux_order(
            vec![Tool::new("wl-paste", &["--type", "image/png"])],
            vec![Tool::new(
                "xclip",
                &["-selection", "clipboard", "-t", "image/png", "-o"],
            )],
        )
    }
}

/// Feed `bytes` to the first tool that runs successfully.
pub fn write_clipboard(tools: &[Tool], bytes: &[u8]) -> Result<()> {
    let mut last_error = None;
    for tool in tools {
        let spawned = Command::new(&tool.program)
            .args(&tool.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => {
                last_error = Some(anyhow!("Failed to spawn {}: {}", tool.program, e));
                continue;
            }
        };

        // Dropping stdin closes the pipe so the tool sees end of input
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(bytes),
            None => Ok(()),
        };
        let status = child
            .wait()
            .with_context(|| format!("Failed to wait for {}", tool.program))?;
        match written {
            Ok(()) if status.success() => {
                debug!(tool = %tool.program, bytes = bytes.len(), "clipboard written");
                return Ok(());
            }
            Ok(()) => last_error = Some(anyhow!("{} exited with {}", tool.program, status)),
            Err(e) => {
                debug!(tool = %tool.program, error = %e, "clipboard tool did not take input");
                last_error = Some(anyhow!(
                    "{} exited with {} before reading input: {}",
                    tool.program,
                    status,
                    e
                ));
            }
        }
    }
    Err(last_error.unwrap_or_else(|| no_tool_error(tools)))
}

/// Output of the first tool that succeeds with non-empty output. `None` when
/// some tool ran but none had anything to give.
pub fn read_clipboard(tools: &[Tool]) -> Result<Option<Vec<u8>>> {
    let mut any_ran = false;
    let mut last_error = None;
    for tool in tools {
        let output = match Command::new(&tool.program)
            .args(&tool.args)
            .stdin(Stdio::null())
            .output()
        {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => {
                last_error = Some(anyhow!("Failed to execute {}: {}", tool.program, e));
                continue;
            }
        };
        any_ran = true;
        if output.status.success() && !output.stdout.is_empty() {
            debug!(tool = %tool.program, bytes = output.stdout.len(), "clipboard read");
            return Ok(Some(output.stdout));
        }
    }
    if any_ran {
        Ok(None)
    } else {
        Err(last_error.unwrap_or_else(|| no_tool_error(tools)))
    }
}

fn no_tool_error(tools: &[Tool]) -> anyhow::Error {
    let names: Vec<&str> = tools.iter().map(|t| t.program.as_str()).collect();
    anyhow!("No clipboard tool found. Install one of: {}", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing() -> Tool {
        Tool::new("snipjar-no-such-clipboard-tool", &[])
    }

    #[test]
    fn test_read_without_any_tool_is_an_error() {
        let err = read_clipboard(&[missing()]).unwrap_err();
        assert!(err.to_string().contains("No clipboard tool found"));
    }

    #[test]
    fn test_write_without_any_tool_is_an_error() {
        assert!(write_clipboard(&[missing()], b"x").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_read_falls_through_to_next_tool() {
        let tools = [
            missing(),
            Tool::new("sh", &["-c", "exit 1"]),
            Tool::new("sh", &["-c", "printf hello"]),
        ];
        assert_eq!(read_clipboard(&tools).unwrap(), Some(b"hello".to_vec()));
    }

    #[cfg(unix)]
    #[test]
    fn test_read_with_empty_output_is_none() {
        let tools = [Tool::new("sh", &["-c", "exit 0"])];
        assert_eq!(read_clipboard(&tools).unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_pipes_bytes_to_tool() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("clip.txt");
        let script = format!("cat > '{}'", out.display());
        let tools = [Tool::new("sh", &["-c", &script])];

        write_clipboard(&tools, b"copied").unwrap();

        assert_eq!(std::fs::read(&out).unwrap(), b"copied");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_moves_on_when_tool_ignores_input() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("clip.bin");
        let script = format!("cat > '{}'", out.display());
        let tools = [
            Tool::new("sh", &["-c", "exit 1"]),
            Tool::new("sh", &["-c", &script]),
        ];
        let payload = vec![b'x'; 1 << 20];

        write_clipboard(&tools, &payload).unwrap();

        assert_eq!(std::fs::read(&out).unwrap(), payload);
    }

    #[cfg(unix)]
    #[test]
    fn test_read_moves_on_when_tool_cannot_start() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let locked = dir.path().join("locked-tool");
        std::fs::write(&locked, "#!/bin/sh\nprintf nope\n").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o644)).unwrap();
        let tools = [
            Tool::new(locked.to_str().unwrap(), &[]),
            Tool::new("sh", &["-c", "printf fallback"]),
        ];

        assert_eq!(read_clipboard(&tools).unwrap(), Some(b"fallback".to_vec()));
    }

    #[test]
    fn test_script_literals_escape_quotes() {
        let path = Path::new("/tmp/it's \"here\".png");
        assert_eq!(applescript_string(path), r#""/tmp/it's \"here\".png""#);
        assert_eq!(powershell_string(path), r#"'/tmp/it''s "here".png'"#);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_reports_failing_tool() {
        let tools = [Tool::new("sh", &["-c", "cat > /dev/null; exit 3"])];
        let err = write_clipboard(&tools, b"x").unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }
}
