//! Output formatting for CLI commands

use serde::Serialize;

use crate::schedule::ScheduleWarning;
use crate::storage;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<storage::OutputFormat> for OutputFormat {
    fn from(format: storage::OutputFormat) -> Self {
        match format {
            storage::OutputFormat::Text => OutputFormat::Text,
            storage::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints advisories to stderr (text only; JSON payloads carry their own)
    pub fn warnings(&self, warnings: &[ScheduleWarning]) {
        if self.format == OutputFormat::Text {
            for warning in warnings {
                eprintln!("Warning: {}", warning);
            }
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        match self.format {
            OutputFormat::Text => {
                // Fallback for callers without a text rendering
                if let Ok(json) = serde_json::to_string_pretty(data) {
                    println!("{}", json);
                }
            }
            OutputFormat::Json => {
                if let Ok(json) = serde_json::to_string(data) {
                    println!("{}", json);
                }
            }
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Prints a verbose debug message (only when --verbose is set)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Prints a verbose debug message with context (only when --verbose is set)
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}

/// JSON form of advisories: `[{kind, message}]`
pub fn warnings_json(warnings: &[ScheduleWarning]) -> Vec<serde_json::Value> {
    warnings
        .iter()
        .map(|w| {
            serde_json::json!({
                "kind": w.kind(),
                "message": w.to_string(),
            })
        })
        .collect()
}

/// Renders an optional date as `YYYY-MM-DD` or `-`
pub fn date_or_dash(date: Option<chrono::NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_carry_kind_and_message() {
        let warning = ScheduleWarning::DependsOnCompletedTask("a".parse().unwrap());
        let json = warnings_json(&[warning]);

        assert_eq!(json[0]["kind"], "depends_on_completed_task");
        assert!(json[0]["message"].as_str().unwrap().contains("a"));
    }

    #[test]
    fn missing_dates_render_as_dash() {
        assert_eq!(date_or_dash(None), "-");
        assert_eq!(
            date_or_dash(Some("2024-01-05".parse().unwrap())),
            "2024-01-05"
        );
    }
}
