//! Renders directory entries as UNIX `ls -l` style lines.
//!
//! The format is locale-independent on purpose: month names are hard-coded
//! English abbreviations because common clients parse listings heuristically
//! and choke on anything else.

use super::error::Error;
use cap_std::fs::Dir;
use chrono::{DateTime, Datelike, Local, Timelike};
use std::fmt::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

const MONTHS: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

// Entries modified within this window show a clock time, older ones show the
// year, like ls does.
const RECENT_DAYS: i64 = 180;

/// A single directory entry as the listing formatter needs it.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    /// Bare file name, no path components.
    pub name: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Size in bytes; reported as 0 for directories.
    pub size: u64,
    /// Last modification time.
    pub modified: SystemTime,
}

/// Reads a directory under the sandbox handle and returns its entries with
/// directories first. Within each group the entries keep the order the host
/// filesystem returned them in.
pub(crate) async fn scan_dir(dir: Arc<Dir>, path: PathBuf) -> Result<Vec<Entry>, Error> {
    super::cap_fs::asyncify(move || {
        let mut dirs: Vec<Entry> = Vec::new();
        let mut files: Vec<Entry> = Vec::new();
        for dirent in dir.read_dir(&path)? {
            let dirent = dirent?;
            let meta = match dirent.metadata() {
                Ok(meta) => meta,
                // The entry may have been removed while we were listing; skip it.
                Err(_) => continue,
            };
            let entry = Entry {
                name: dirent.file_name().to_string_lossy().into_owned(),
                is_dir: meta.is_dir(),
                size: if meta.is_dir() { 0 } else { meta.len() },
                modified: meta.modified().map(cap_std::time::SystemTime::into_std).unwrap_or(SystemTime::UNIX_EPOCH),
            };
            if entry.is_dir { dirs.push(entry) } else { files.push(entry) }
        }
        dirs.extend(files);
        Ok(dirs)
    })
    .await
    .map_err(Error::from)
}

/// Formats one `ls -l` style line, without the trailing CRLF.
///
/// `now` is injected so the recent-versus-old cutoff is testable.
pub(crate) fn format_line(entry: &Entry, now: DateTime<Local>) -> String {
    let perms = if entry.is_dir { "drwxrwxrwx" } else { "-rw-rw-rw-" };
    let modified: DateTime<Local> = entry.modified.into();
    let age_days = now.signed_duration_since(modified).num_days().abs();
    let time_or_year = if age_days < RECENT_DAYS {
        format!("{:02}:{:02}", modified.hour(), modified.minute())
    } else {
        format!("{:>5}", modified.year())
    };
    format!(
        "{perms} {links:>3} {owner:<8} {group:<8} {size:>12} {month} {day:>2} {time_or_year} {name}",
        links = 1,
        owner = "owner",
        group = "group",
        size = entry.size,
        month = MONTHS[modified.month0() as usize],
        day = modified.day(),
        name = entry.name,
    )
}

/// Renders a complete `LIST` payload: one formatted line per entry, each
/// CRLF-terminated.
pub(crate) fn format_listing(entries: &[Entry]) -> String {
    let now = Local::now();
    entries.iter().fold(String::new(), |mut buf, entry| {
        let _ = write!(buf, "{}\r\n", format_line(entry, now));
        buf
    })
}

/// Renders a complete `NLST` payload: bare names, one per CRLF-terminated
/// line.
pub(crate) fn format_names(entries: &[Entry]) -> String {
    entries.iter().fold(String::new(), |mut buf, entry| {
        let _ = write!(buf, "{}\r\n", entry.name);
        buf
    })
}
