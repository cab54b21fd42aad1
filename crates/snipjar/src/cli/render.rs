//! Output formatting. Functions here build strings; `commands.rs` prints them.

use chrono::{DateTime, Utc};
use console::style;
use snipjarapp::api::SnipPaths;
use snipjarapp::catalog::{CatalogEntry, Preview};
use snipjarapp::model::ItemKind;
use snipjarapp::store::DoctorReport;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const DEFAULT_LINE_WIDTH: usize = 80;
const COL_ID: usize = 8;
const COL_KIND: usize = 5;
const COL_TIME: usize = 3;
const GAP: &str = "  ";
const ELLIPSIS: char = '…';

pub fn render_list(entries: &[CatalogEntry], line_width: usize) -> String {
    if entries.is_empty() {
        return format!(
            "{}\n",
            style("No snippets yet. Add one with `snipjar add`.").dim()
        );
    }

    let fixed = COL_ID + COL_KIND + COL_TIME + GAP.len() * 3;
    let preview_width = line_width.saturating_sub(fixed).max(10);

    let mut out = String::new();
    for entry in entries {
        let item = &entry.item;
        let kind = format!("{:<width$}", item.kind.label(), width = COL_KIND);
        let kind = match item.kind {
            ItemKind::Text => style(kind).cyan(),
            ItemKind::Image => style(kind).magenta(),
        };
        let age = item
            .captured_at
            .map(format_time_ago)
            .unwrap_or_else(|| format!("{:>width$}", "-", width = COL_TIME));

        let id = format!("{:<width$}", item.id.short(), width = COL_ID);

        out.push_str(&format!(
            "{}{GAP}{}{GAP}{}{GAP}{}\n",
            style(id).yellow(),
            kind,
            style(age).dim(),
            truncate(&preview_text(&entry.preview), preview_width),
        ));
    }
    out
}

pub fn render_json(entries: &[CatalogEntry]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(entries).map(|mut json| {
        json.push('\n');
        json
    })
}

pub fn render_doctor(report: &DoctorReport) -> String {
    if report.is_clean() {
        return "Everything looks fine.\n".to_string();
    }
    let mut out = String::new();
    for (id, path) in &report.regenerated_thumbnails {
        out.push_str(&format!(
            "Regenerated thumbnail for {}: {}\n",
            id.short(),
            path.display()
        ));
    }
    if report.failed_thumbnails > 0 {
        out.push_str(&format!(
            "{} image(s) still have no thumbnail. Is the thumbnail program installed?\n",
            report.failed_thumbnails
        ));
    }
    if report.removed_orphan_thumbnails > 0 {
        out.push_str(&format!(
            "Removed {} orphaned thumbnail(s).\n",
            report.removed_orphan_thumbnails
        ));
    }
    if report.removed_temp_files > 0 {
        out.push_str(&format!(
            "Removed {} leftover temp file(s).\n",
            report.removed_temp_files
        ));
    }
    out
}

pub fn render_paths(paths: &SnipPaths) -> String {
    format!(
        "data   {}\nitems  {}\nthumbs {}\n",
        paths.data_dir.display(),
        paths.items_dir.display(),
        paths.thumbs_dir.display()
    )
}

fn preview_text(preview: &Preview) -> String {
    match preview {
        Preview::Excerpt(text) => text.clone(),
        Preview::Image(path) => format!(
            "[image] {}",
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        ),
    }
}

/// Cut `text` to at most `max_width` terminal columns, marking the cut.
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let budget = max_width.saturating_sub(1);
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push(ELLIPSIS);
    out
}

pub fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let secs = Utc::now()
        .signed_duration_since(timestamp)
        .num_seconds()
        .max(0) as u64;

    let (value, unit) = if secs < 60 {
        (secs, 's')
    } else if secs < 3600 {
        (secs / 60, 'm')
    } else if secs < 86400 {
        (secs / 3600, 'h')
    } else if secs < 86400 * 7 {
        (secs / 86400, 'd')
    } else if secs < 86400 * 30 {
        (secs / (86400 * 7), 'w')
    } else if secs < 86400 * 365 {
        (secs / (86400 * 30), 'M')
    } else {
        (secs / (86400 * 365), 'y')
    };

    format!("{:2}{}", value, unit)
}
