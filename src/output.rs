//! JSON output of scouting records.

use std::io::Write;

use scout_core::OutputRecord;

use crate::config::OutputConfig;
use crate::error::{AppError, Result};

/// Serialize `records` as a JSON array.
///
/// # Errors
///
/// Returns [`AppError::Output`] if serialization fails.
pub fn render(records: &[OutputRecord], pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(records)
    } else {
        serde_json::to_string(records)
    };
    json.map_err(|e| AppError::Output(e.to_string()))
}

/// Write `records` to the configured file, or to stdout when none is set.
///
/// # Errors
///
/// Returns an error if the records cannot be serialized or written.
pub fn write_records(records: &[OutputRecord], config: &OutputConfig) -> Result<()> {
    let mut json = render(records, config.pretty)?;
    json.push('\n');

    match &config.path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, json)?;
            tracing::info!(path = %path.display(), count = records.len(), "records written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use scout_core::Emails;

    fn record(name: &str, emails: Emails, country: Option<&str>) -> OutputRecord {
        OutputRecord {
            name: name.into(),
            url: format!("https://youtube.com/@{name}"),
            avatar: String::new(),
            size_label: "61.2K subscribers".into(),
            audience: 61_200,
            description: "desc".into(),
            country: country.map(str::to_owned),
            emails,
            keyword: "crypto".into(),
        }
    }

    #[test]
    fn empty_run_renders_empty_array() {
        assert_eq!(render(&[], false).expect("render"), "[]");
    }

    #[test]
    fn records_render_in_order_with_sentinel() {
        let records = vec![
            record("a", Emails::Found(vec!["a@x.io".into()]), Some("Canada")),
            record("b", Emails::NotFound, None),
        ];
        let json: serde_json::Value =
            serde_json::from_str(&render(&records, true).expect("render")).expect("parse");

        assert_eq!(json[0]["name"], "a");
        assert_eq!(json[0]["emails"], serde_json::json!(["a@x.io"]));
        assert_eq!(json[0]["country"], "Canada");
        assert_eq!(json[1]["emails"], serde_json::json!(["No email found"]));
        assert!(json[1].get("country").is_none());
    }

    #[test]
    fn writes_to_configured_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("records.json");
        let config = OutputConfig {
            path: Some(path.clone()),
            pretty: false,
        };

        write_records(&[record("a", Emails::NotFound, None)], &config).expect("write");

        let written = std::fs::read_to_string(&path).expect("read back");
        assert!(written.starts_with("[{\"name\":\"a\""));
        assert!(written.ends_with("]\n"));
    }
}
