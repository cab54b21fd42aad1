//! External thumbnail tool behavior against real processes.
//!
//! Fake tools are small shell scripts, so most of these only run on unix. The
//! real ffmpeg test is ignored by default; run it with `cargo test -- --ignored`
//! on a machine that has ffmpeg.

use snipjarapp::model::ItemKind;
use snipjarapp::store::fs_backend::FsBackend;
use snipjarapp::store::{DataStore, FileStore, ItemStore};
use snipjarapp::thumbnail::{ExternalThumbnailer, ThumbnailOutcome, Thumbnailer};
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn leftovers(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with('.'))
        .collect()
}

fn file_store(root: &Path, thumbnailer: ExternalThumbnailer) -> FileStore {
    let backend = FsBackend::new(root.join("items"), root.join("thumbs"));
    backend.ensure_dirs().unwrap();
    ItemStore::new(backend, thumbnailer)
}

#[test]
fn test_missing_tool_is_an_outcome_not_a_failure() {
    let root = TempDir::new().unwrap();
    let mut store = file_store(
        root.path(),
        ExternalThumbnailer::new(root.path().join("no-such-tool")),
    );

    let item = store.put_image(b"\x89PNG not really").unwrap();

    assert_eq!(item.kind, ItemKind::Image);
    assert!(item.thumbnail_path.is_none());
    assert_eq!(fs::read(&item.content_path).unwrap(), b"\x89PNG not really");
    assert!(fs::read_dir(root.path().join("thumbs")).unwrap().next().is_none());
}

#[cfg(unix)]
mod fake_tools {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    /// Write an executable shell script. `$out` holds the output path.
    fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let script = format!(
            "#!/bin/sh\nfor arg in \"$@\"; do out=\"$arg\"; done\n{}\n",
            body
        );
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn run(tool: ExternalThumbnailer, root: &Path) -> (ThumbnailOutcome, PathBuf) {
        let thumbs = root.join("thumbs");
        fs::create_dir_all(&thumbs).unwrap();
        let source = root.join("source.png");
        fs::write(&source, b"png").unwrap();
        let dest = thumbs.join("x_thumb.jpg");
        (tool.generate(&source, &dest), dest)
    }

    #[test]
    fn test_successful_tool_output_is_moved_into_place() {
        let root = TempDir::new().unwrap();
        let tool = fake_tool(root.path(), "ok.sh", "printf jpeg > \"$out\"");

        let (outcome, dest) = run(ExternalThumbnailer::new(tool), root.path());

        assert!(outcome.is_generated());
        assert_eq!(fs::read(&dest).unwrap(), b"jpeg");
        assert!(leftovers(dest.parent().unwrap()).is_empty());
    }

    #[test]
    fn test_tool_receives_scale_arguments() {
        let root = TempDir::new().unwrap();
        let log = root.path().join("args.txt");
        let body = format!("echo \"$@\" > '{}'\nprintf jpeg > \"$out\"", log.display());
        let tool = fake_tool(root.path(), "log.sh", &body);

        let (outcome, _) = run(ExternalThumbnailer::new(tool).with_width(120), root.path());

        assert!(outcome.is_generated());
        let args = fs::read_to_string(&log).unwrap();
        assert!(args.contains("-vf scale=120:-1"), "args were: {}", args);
        assert!(args.contains("-vframes 1"), "args were: {}", args);
    }

    #[test]
    fn test_nonzero_exit_leaves_no_thumbnail() {
        let root = TempDir::new().unwrap();
        let tool = fake_tool(root.path(), "fail.sh", "printf partial > \"$out\"\nexit 1");

        let (outcome, dest) = run(ExternalThumbnailer::new(tool), root.path());

        assert!(!outcome.is_generated());
        assert!(!dest.exists());
        assert!(leftovers(dest.parent().unwrap()).is_empty());
    }

    #[test]
    fn test_empty_output_with_success_exit_leaves_no_thumbnail() {
        let root = TempDir::new().unwrap();
        let tool = fake_tool(root.path(), "empty.sh", ": > \"$out\"\nexit 0");

        let (outcome, dest) = run(ExternalThumbnailer::new(tool), root.path());

        assert!(!outcome.is_generated());
        assert!(!dest.exists());
        assert!(leftovers(dest.parent().unwrap()).is_empty());
    }

    #[test]
    fn test_slow_tool_is_killed_after_timeout() {
        let root = TempDir::new().unwrap();
        let tool = fake_tool(root.path(), "slow.sh", "sleep 5\nprintf jpeg > \"$out\"");
        let thumbnailer =
            ExternalThumbnailer::new(tool).with_timeout(Duration::from_millis(200));

        let started = Instant::now();
        let (outcome, dest) = run(thumbnailer, root.path());

        assert!(started.elapsed() < Duration::from_secs(4));
        match outcome {
            ThumbnailOutcome::Unavailable(reason) => assert!(reason.contains("timed out")),
            ThumbnailOutcome::Generated => panic!("slow tool should not produce a thumbnail"),
        }
        assert!(!dest.exists());
    }

    #[test]
    fn test_helpers_die_with_timed_out_tool() {
        let root = TempDir::new().unwrap();
        let tool = fake_tool(
            root.path(),
            "wrapper.sh",
            "(sleep 1; printf late > \"$out\") &\nwait",
        );
        let thumbnailer =
            ExternalThumbnailer::new(tool).with_timeout(Duration::from_millis(200));

        let (outcome, dest) = run(thumbnailer, root.path());
        assert!(!outcome.is_generated());

        std::thread::sleep(Duration::from_millis(1500));
        assert!(!dest.exists());
        assert!(leftovers(dest.parent().unwrap()).is_empty());
    }

    #[test]
    fn test_content_is_complete_before_tool_runs() {
        let root = TempDir::new().unwrap();
        let image: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
        let expected = root.path().join("expected.png");
        fs::write(&expected, &image).unwrap();
        // Arguments are: -nostdin -y -i <source> ...
        let body = format!(
            "cmp -s \"$4\" '{}' || exit 1\nprintf jpeg > \"$out\"",
            expected.display()
        );
        let tool = fake_tool(root.path(), "check.sh", &body);
        let mut store = file_store(root.path(), ExternalThumbnailer::new(tool));

        let item = store.put_image(&image).unwrap();

        assert!(item.thumbnail_path.is_some());
        assert_eq!(fs::read(&item.content_path).unwrap(), image);
    }

    #[test]
    fn test_failed_image_write_never_runs_tool() {
        let root = TempDir::new().unwrap();
        let marker = root.path().join("ran");
        let body = format!(": > '{}'\nprintf jpeg > \"$out\"", marker.display());
        let tool = fake_tool(root.path(), "mark.sh", &body);
        let mut store = file_store(root.path(), ExternalThumbnailer::new(tool));
        // Replace the items directory with a plain file so no content can be written
        fs::remove_dir(root.path().join("items")).unwrap();
        fs::write(root.path().join("items"), "not a directory").unwrap();

        assert!(store.put_image(b"img").is_err());

        assert!(!marker.exists());
        assert!(fs::read_dir(root.path().join("thumbs")).unwrap().next().is_none());
    }

    #[test]
    fn test_store_survives_failing_tool_and_doctor_retries() {
        let root = TempDir::new().unwrap();
        let flag = root.path().join("working");
        let body = format!(
            "[ -e '{}' ] || exit 1\nprintf jpeg > \"$out\"",
            flag.display()
        );
        let tool = fake_tool(root.path(), "flaky.sh", &body);
        let mut store = file_store(root.path(), ExternalThumbnailer::new(tool));

        let item = store.put_image(b"img").unwrap();
        assert!(item.thumbnail_path.is_none());
        assert_eq!(store.list().unwrap().len(), 1);

        fs::write(&flag, "").unwrap();
        let report = store.doctor().unwrap();

        assert_eq!(report.regenerated_thumbnails.len(), 1);
        let listed = store.get(&item.id).unwrap();
        assert_eq!(
            listed.thumbnail_path,
            Some(root.path().join("thumbs").join(format!("{}_thumb.jpg", item.id)))
        );
    }
}

fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

#[test]
#[ignore = "needs ffmpeg on PATH"]
fn test_real_ffmpeg_thumbnail_is_small_jpeg() {
    assert!(ffmpeg_available(), "ffmpeg is not on PATH");
    let root = TempDir::new().unwrap();
    let picture = image::RgbImage::from_fn(400, 300, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut png = Vec::new();
    picture
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    let mut store = file_store(root.path(), ExternalThumbnailer::default());

    let item = store.put_image(&png).unwrap();

    let thumb = item.thumbnail_path.expect("ffmpeg should produce a thumbnail");
    let (width, height) = image::image_dimensions(&thumb).unwrap();
    assert!(width > 0 && width <= 160, "width was {}", width);
    assert!(height > 0);
    let bytes = fs::read(&thumb).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8], "thumbnail should be a JPEG");
    assert_eq!(fs::read(&item.content_path).unwrap(), png);
}
