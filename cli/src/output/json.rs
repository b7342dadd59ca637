//! JSON output helpers.
//!
//! Every `--json` code path prints exactly one pretty-printed document on
//! stdout: a run report, the version, or an error object.

use anyhow::{Context, Result};

use crate::domain::report::RunReport;

/// Machine-readable renderer.
pub struct JsonRenderer;

impl JsonRenderer {
    /// Print the run report.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_report(&self, report: &RunReport) -> Result<()> {
        println!("{}", format_report(report)?);
        Ok(())
    }

    /// Print `{"version": ...}`.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        let obj = serde_json::json!({ "version": version });
        println!(
            "{}",
            serde_json::to_string_pretty(&obj).context("JSON serialization failed")?
        );
        Ok(())
    }
}

/// Serialize a run report with a `clean` summary flag.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_report(report: &RunReport) -> Result<String> {
    let mut value = serde_json::to_value(report).context("JSON serialization failed")?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("clean".to_string(), serde_json::Value::Bool(report.is_clean()));
    }
    serde_json::to_string_pretty(&value).context("JSON serialization failed")
}

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}
