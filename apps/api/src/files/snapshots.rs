//! Diff and backup records.
//!
//! Both are markdown files written under a `diffs` directory next to the file
//! they describe. They are write-once: nothing in the service reads them back,
//! and a name collision picks a fresh `_<n>` suffix instead of overwriting.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::fs;
use tracing::info;

use crate::files::error::FileResult;
use crate::files::paths::diffs_dir_for;

/// `YYYY_MM_DD_HH_MM_SS`, used in record file names.
pub fn file_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y_%m_%d_%H_%M_%S").to_string()
}

/// Writes a backup of `content` for a file that is about to be deleted.
pub async fn write_backup(file: &Path, content: &str, at: DateTime<Utc>) -> FileResult<PathBuf> {
    let dir = diffs_dir_for(file);
    fs::create_dir_all(&dir).await?;

    let stem = format!("deleted_{}", file_timestamp(at));
    let target = unique_record_path(&dir, &stem, "backup").await?;
    fs::write(&target, render_backup(file, content, at)).await?;

    info!("Wrote backup of {} to {}", file.display(), target.display());
    Ok(target)
}

/// Writes a diff record describing the change from `previous` to `current`.
pub async fn write_diff(
    file: &Path,
    previous: &str,
    current: &str,
    at: DateTime<Utc>,
) -> FileResult<PathBuf> {
    let dir = diffs_dir_for(file);
    fs::create_dir_all(&dir).await?;

    let stem = format!("diff_{}", file_timestamp(at));
    let target = unique_record_path(&dir, &stem, "md").await?;
    fs::write(&target, render_diff(file, previous, current, at)).await?;

    info!("Wrote diff for {} to {}", file.display(), target.display());
    Ok(target)
}

async fn unique_record_path(dir: &Path, stem: &str, extension: &str) -> FileResult<PathBuf> {
    let mut candidate = dir.join(format!("{stem}.{extension}"));
    let mut n = 1;
    while fs::try_exists(&candidate).await? {
        candidate = dir.join(format!("{stem}_{n}.{extension}"));
        n += 1;
    }
    Ok(candidate)
}

pub fn render_backup(file: &Path, content: &str, at: DateTime<Utc>) -> String {
    let fence = fence_for(content);
    let mut md = String::from("# Deleted File Backup\n\n");
    md.push_str(&format!("- **Original Path:** {}\n", file.display()));
    md.push_str(&format!(
        "- **Deleted At:** {}\n\n",
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    ));
    md.push_str("## Content\n\n");
    md.push_str(&format!("{fence}{}\n", fence_language(file)));
    md.push_str(content);
    if !content.ends_with('\n') {
        md.push('\n');
    }
    md.push_str(&fence);
    md.push('\n');
    md
}

pub fn render_diff(file: &Path, previous: &str, current: &str, at: DateTime<Utc>) -> String {
    let previous_size = previous.len() as i64;
    let current_size = current.len() as i64;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let mut md = format!("# Diff: {name}\n\n");
    md.push_str(&format!("- **File:** {}\n", file.display()));
    md.push_str(&format!(
        "- **Timestamp:** {}\n",
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    ));
    md.push_str(&format!("- **Previous size:** {previous_size} bytes\n"));
    md.push_str(&format!("- **New size:** {current_size} bytes\n"));
    md.push_str(&format!(
        "- **Size change:** {:+} bytes\n\n",
        current_size - previous_size
    ));

    let changes = line_changes(previous, current);
    md.push_str("## Changes\n\n");
    push_block(&mut md, "diff", &changes);

    md.push_str("## Before\n\n");
    if previous.is_empty() {
        md.push_str("_(new file)_\n\n");
    } else {
        push_block(&mut md, fence_language(file), previous);
    }

    md.push_str("## After\n\n");
    push_block(&mut md, fence_language(file), current);
    md
}

fn push_block(md: &mut String, language: &str, body: &str) {
    let fence = fence_for(body);
    md.push_str(&format!("{fence}{language}\n"));
    md.push_str(body);
    if !body.is_empty() && !body.ends_with('\n') {
        md.push('\n');
    }
    md.push_str(&fence);
    md.push_str("\n\n");
}

/// Line-level changes with the common prefix and suffix trimmed.
fn line_changes(previous: &str, current: &str) -> String {
    let old_lines: Vec<&str> = previous.lines().collect();
    let new_lines: Vec<&str> = current.lines().collect();

    let prefix = old_lines
        .iter()
        .zip(new_lines.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let old_rest = &old_lines[prefix..];
    let new_rest = &new_lines[prefix..];

    let suffix = old_rest
        .iter()
        .rev()
        .zip(new_rest.iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let removed = &old_rest[..old_rest.len() - suffix];
    let added = &new_rest[..new_rest.len() - suffix];

    if removed.is_empty() && added.is_empty() {
        // Only trailing newline or line-ending differences.
        return "(whitespace-only change)\n".to_string();
    }

    let mut out = format!(
        "@@ -{},{} +{},{} @@\n",
        prefix + 1,
        removed.len(),
        prefix + 1,
        added.len()
    );
    for line in removed {
        out.push_str(&format!("-{line}\n"));
    }
    for line in added {
        out.push_str(&format!("+{line}\n"));
    }
    out
}

/// A backtick fence longer than any backtick run inside `content`.
fn fence_for(content: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in content.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat(longest.max(2) + 1)
}

fn fence_language(file: &Path) -> &'static str {
    match file.extension().and_then(|e| e.to_str()) {
        Some("yml") | Some("yaml") => "yaml",
        Some("json") => "json",
        Some("md") => "markdown",
        _ => "",
    }
}
