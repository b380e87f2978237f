//! CSV batch processing: read a dataset with a `url` column, classify every
//! row and write the enhanced dataset plus a legitimate-only subset.

use crate::detector::{BatchResult, PhishingDetector};
use crate::scorer::Classification;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const ALL_RESULTS_FILE: &str = "enhanced_dataset.csv";
pub const LEGITIMATE_FILE: &str = "legitimate_sites.csv";

const RESULT_COLUMNS: [&str; 6] = [
    "url_length",
    "has_ssl",
    "suspicious_keywords",
    "domain_age",
    "pattern_analysis",
    "classification",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Parse RFC 4180 style CSV: quoted fields may hold commas, newlines and
    /// doubled quotes. Blank lines are skipped.
    pub fn parse(content: &str) -> Result<Self> {
        let mut records: Vec<Vec<String>> = Vec::new();
        let mut record: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut chars = content.trim_start_matches('\u{feff}').chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '"' if in_quotes => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        current.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                '"' => in_quotes = true,
                ',' if !in_quotes => {
                    record.push(std::mem::take(&mut current));
                }
                '\r' if !in_quotes => {}
                '\n' if !in_quotes => {
                    record.push(std::mem::take(&mut current));
                    records.push(std::mem::take(&mut record));
                }
                _ => current.push(ch),
            }
        }
        if in_quotes {
            return Err(anyhow!("unterminated quoted field"));
        }
        if !current.is_empty() || !record.is_empty() {
            record.push(current);
            records.push(record);
        }

        records.retain(|r| !(r.len() == 1 && r[0].trim().is_empty()));

        let mut records = records.into_iter();
        let header: Vec<String> = records
            .next()
            .ok_or_else(|| anyhow!("dataset is empty"))?
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();

        let rows = records
            .map(|mut row| {
                row.resize(header.len().max(row.len()), String::new());
                row
            })
            .collect();

        Ok(Self { header, rows })
    }

    /// Index of a column, matching the header case-insensitively
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h.eq_ignore_ascii_case(name))
    }
}

pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_row(out: &mut String, fields: &[String]) {
    let line: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

fn result_fields(result: &BatchResult) -> Vec<String> {
    let features = &result.features;
    vec![
        features.url_length.to_string(),
        u8::from(features.has_ssl).to_string(),
        u8::from(features.has_suspicious_keyword).to_string(),
        features.domain_age_days.to_string(),
        features.pattern_verdict.to_string(),
        result.classification.to_string(),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub legitimate: usize,
    pub phishing: usize,
    pub all_results: PathBuf,
    pub legitimate_only: PathBuf,
}

pub struct BatchRunner<'a> {
    detector: &'a PhishingDetector,
}

impl<'a> BatchRunner<'a> {
    pub fn new(detector: &'a PhishingDetector) -> Self {
        Self { detector }
    }

    /// Classify every row of `input`; outputs go to `output_dir`, or next to
    /// the input when none is given
    pub async fn run(&self, input: &Path, output_dir: Option<&Path>) -> Result<BatchSummary> {
        let content = fs::read_to_string(input)
            .with_context(|| format!("reading dataset {}", input.display()))?;
        let table = CsvTable::parse(&content)
            .with_context(|| format!("parsing dataset {}", input.display()))?;
        let url_column = table
            .column("url")
            .ok_or_else(|| anyhow!("dataset {} has no 'url' column", input.display()))?;

        let urls: Vec<&str> = table
            .rows
            .iter()
            .map(|row| row[url_column].trim())
            .collect();
        let results = self.detector.classify_batch(&urls).await;

        let mut header = table.header.clone();
        header.extend(RESULT_COLUMNS.iter().map(|c| c.to_string()));

        let mut all_csv = String::new();
        let mut legit_csv = String::new();
        write_row(&mut all_csv, &header);
        write_row(&mut legit_csv, &header);

        let mut legitimate = 0;
        for (row, result) in table.rows.iter().zip(&results) {
            let mut fields = row.clone();
            fields.extend(result_fields(result));

            write_row(&mut all_csv, &fields);
            if result.classification == Classification::Legitimate {
                legitimate += 1;
                write_row(&mut legit_csv, &fields);
            }
        }

        let output_dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("creating output directory {}", output_dir.display()))?;

        let all_results = output_dir.join(ALL_RESULTS_FILE);
        let legitimate_only = output_dir.join(LEGITIMATE_FILE);
        fs::write(&all_results, all_csv)
            .with_context(|| format!("writing {}", all_results.display()))?;
        fs::write(&legitimate_only, legit_csv)
            .with_context(|| format!("writing {}", legitimate_only.display()))?;

        log::info!(
            "Dataset processing complete: {} rows, {} legitimate",
            results.len(),
            legitimate
        );

        Ok(BatchSummary {
            total: results.len(),
            legitimate,
            phishing: results.len() - legitimate,
            all_results,
            legitimate_only,
        })
    }
}
