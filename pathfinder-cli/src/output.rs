//! Result lines on stdout and status lines on stderr.
use colored::{Color, Colorize};
use pathfinder::SearchStats;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// How each result is written
#[derive(Debug, Clone, Copy, Default)]
pub struct Printer {
    pub json: bool,
    /// Append modified and created times
    pub file_info: bool,
}

impl Printer {
    pub fn new(json: bool, file_info: bool) -> Self {
        Self { json, file_info }
    }

    pub fn print(&self, path: &Path) {
        println!("{}", self.render(path));
    }

    pub fn render(&self, path: &Path) -> String {
        let times = if self.file_info {
            file_times(path)
        } else {
            Vec::new()
        };

        if self.json {
            let mut obj = Map::new();
            obj.insert(
                "path".to_string(),
                Value::String(path.to_string_lossy().into_owned()),
            );
            for (key, value) in times {
                obj.insert(key.to_string(), Value::String(value));
            }
            Value::Object(obj).to_string()
        } else if times.is_empty() {
            path.display().to_string()
        } else {
            let extra: Vec<String> = times.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            format!("{}  [{}]", path.display(), extra.join(", "))
        }
    }
}

fn file_times(path: &Path) -> Vec<(&'static str, String)> {
    let Ok(meta) = fs::metadata(path) else {
        return Vec::new();
    };
    let mut times = Vec::new();
    if let Ok(modified) = meta.modified() {
        times.push(("modified", format_time(modified)));
    }
    if let Ok(created) = meta.created() {
        times.push(("created", format_time(created)));
    }
    times
}

fn format_time(t: SystemTime) -> String {
    humantime::format_rfc3339_seconds(t).to_string()
}

/// Two status lines for one pass: how many files, and where the time went
pub fn print_status(label: &str, stats: &SearchStats) {
    let color = if stats.emitted > 0 {
        Color::Green
    } else {
        Color::Red
    };
    eprintln!(
        "\n{}",
        format!("[status] ({}) Files found: {}", label, stats.emitted).color(color)
    );
    eprintln!(
        "{} {}",
        format!(
            "[status] ({}) Time: {:.2}s + {:.2}s idle",
            label,
            stats.active_time().as_secs_f64(),
            stats.idle_time.as_secs_f64()
        )
        .color(color),
        format!("(stop={})", stats.stopped_reason).magenta()
    );
}

pub fn print_hint(message: &str) {
    eprintln!("{}", format!("[status] {}", message).magenta());
}
