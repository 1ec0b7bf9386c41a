use crate::error::Result;
use crate::results::ExtractedRecord;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const DEFAULT_URLS_PATH: &str = "extracted_blogpost_urls.csv";
pub const DEFAULT_DATA_PATH: &str = "extracted_blogpost_data.json";

/// Writes discovered post URLs as a single `URL` column, replacing any existing file
pub fn write_urls_csv<P: AsRef<Path>>(path: P, urls: &[String]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["URL"])?;
    for url in urls {
        writer.write_record([url])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes extracted records as a JSON array indented by four spaces
pub fn write_records_json<P: AsRef<Path>>(path: P, records: &[ExtractedRecord]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    let mut ser = Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut ser)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.csv");
        std::fs::write(&path, "stale content that must disappear\n").unwrap();

        let urls = vec![
            "https://blog.example.com/a/".to_string(),
            "https://blog.example.com/b,with-comma/".to_string(),
        ];
        write_urls_csv(&path, &urls).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "URL\nhttps://blog.example.com/a/\n\"https://blog.example.com/b,with-comma/\"\n"
        );
    }

    #[test]
    fn test_records_json_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        let records = vec![
            ExtractedRecord {
                url: "https://blog.example.com/a/".to_string(),
                title: Some("Hello".to_string()),
                content: Some("World".to_string()),
                error: None,
            },
            ExtractedRecord::failed("https://blog.example.com/b/", "HTTP 500"),
        ];
        write_records_json(&path, &records).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n    {\n        \"url\""));

        let parsed: Vec<ExtractedRecord> = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, records);

        let raw: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert!(raw[0].get("error").is_none());
        assert_eq!(raw[1]["title"], serde_json::Value::Null);
        assert_eq!(raw[1]["error"], "HTTP 500");
    }
}
