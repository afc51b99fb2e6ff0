//! Input abstraction for the upstream extractors.
//!
//! The layout extractor and the visual-asset extractor live outside this
//! crate. Their outputs reach the pipeline through [`SpanSource`] and
//! [`FigureSource`], so a live extractor can replace the file readers here.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::export::read_figures_file;
use crate::model::{FigureRecord, Span};

/// Supplier of reading-order spans for one document.
pub trait SpanSource {
    /// Return all spans, in reading order.
    fn spans(&self) -> Result<Vec<Span>>;
}

/// Supplier of figure metadata for one document.
pub trait FigureSource {
    /// Return all figure records.
    fn figures(&self) -> Result<Vec<FigureRecord>>;
}

impl SpanSource for Vec<Span> {
    fn spans(&self) -> Result<Vec<Span>> {
        Ok(self.clone())
    }
}

impl FigureSource for Vec<FigureRecord> {
    fn figures(&self) -> Result<Vec<FigureRecord>> {
        Ok(self.clone())
    }
}

/// A document without figures.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFigures;

impl FigureSource for NoFigures {
    fn figures(&self) -> Result<Vec<FigureRecord>> {
        Ok(Vec::new())
    }
}

/// Spans read from a JSON array dump.
#[derive(Debug, Clone)]
pub struct JsonSpanSource {
    path: PathBuf,
}

impl JsonSpanSource {
    /// Source backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the dump.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a JSON array of span objects.
    ///
    /// A record that does not match the span schema fails the whole input,
    /// with its position in the message.
    pub fn parse(json: &str) -> Result<Vec<Span>> {
        let records: Vec<Value> = serde_json::from_str(json)?;
        records
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                serde_json::from_value(record)
                    .map_err(|e| Error::Schema(format!("span record {}: {}", i, e)))
            })
            .collect()
    }
}

impl SpanSource for JsonSpanSource {
    fn spans(&self) -> Result<Vec<Span>> {
        let json = fs::read_to_string(&self.path)?;
        let spans = Self::parse(&json)?;
        log::debug!("Loaded {} spans from {}", spans.len(), self.path.display());
        Ok(spans)
    }
}

/// Figure metadata read from a CSV table.
#[derive(Debug, Clone)]
pub struct CsvFigureSource {
    path: PathBuf,
}

impl CsvFigureSource {
    /// Source backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the table.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FigureSource for CsvFigureSource {
    fn figures(&self) -> Result<Vec<FigureRecord>> {
        read_figures_file(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, LinkTarget};

    #[test]
    fn test_parse_spans() {
        let json = r#"[
            {"page": 1, "text": "Intro", "bbox": [50, 40, 300, 56], "font": "Arial-BoldMT",
             "size": 16.0, "color": 0, "bold": true, "italic": false},
            {"page": 1, "text": "see", "bbox": [50, 70, 80, 81], "font": "ArialMT",
             "size": 11.0, "color": 0, "bold": false, "italic": false,
             "hyperlink_target": 12}
        ]"#;
        let spans = JsonSpanSource::parse(json).unwrap();

        assert_eq!(spans.len(), 2);
        assert!(spans[0].bold);
        assert_eq!(spans[0].bbox, BBox::new(50.0, 40.0, 300.0, 56.0));
        assert_eq!(spans[0].hyperlink_target, None);
        assert_eq!(spans[1].hyperlink_target, Some(LinkTarget::Page(12)));
    }

    #[test]
    fn test_record_missing_field_is_schema_error() {
        let json = r#"[{"page": 1, "text": "x", "bbox": [0, 0, 1, 1], "font": "F",
                        "size": 11.0, "color": 0, "bold": false}]"#;
        match JsonSpanSource::parse(json).unwrap_err() {
            Error::Schema(msg) => {
                assert!(msg.starts_with("span record 0"));
                assert!(msg.contains("italic"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_file_sources() {
        let dir = tempfile::tempdir().unwrap();
        let spans_path = dir.path().join("spans.json");
        fs::write(&spans_path, "[]").unwrap();
        assert!(JsonSpanSource::new(&spans_path).spans().unwrap().is_empty());

        let figures_path = dir.path().join("figures.csv");
        fs::write(
            &figures_path,
            "figure_id,figure_number,page,caption_chunk,caption_text,file,saved_ext,bbox,\
             width_px,height_px\nf1,,2,ch0001,,,,,,\n",
        )
        .unwrap();
        let figures = CsvFigureSource::new(&figures_path).figures().unwrap();
        assert_eq!(figures[0].figure_id, "f1");

        let missing = JsonSpanSource::new(dir.path().join("nope.json"));
        assert!(matches!(missing.spans().unwrap_err(), Error::Io(_)));
    }
}
