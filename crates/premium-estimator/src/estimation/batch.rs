use super::domain::PredictionInput;
use super::health::health_score;
use super::scoring::{estimate, PremiumEstimate};
use super::validation::{RawPredictionRequest, ValidationError};
use csv::StringRecord;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Scored applicant from a batch file.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotedApplicant {
    pub input: PredictionInput,
    pub estimate: PremiumEstimate,
    pub health_score: u32,
}

impl QuotedApplicant {
    pub fn from_input(input: PredictionInput) -> Self {
        let estimate = estimate(&input);
        let health_score = health_score(&input);
        Self {
            input,
            estimate,
            health_score,
        }
    }
}

/// Outcome for a single CSV row. `line` is the 1-based line number in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchQuote {
    pub line: usize,
    pub outcome: Result<QuotedApplicant, ValidationError>,
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to read batch file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse batch CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Quote every row of a CSV export whose headers use the raw request field names.
///
/// Rows failing validation are reported in place; malformed CSV aborts the batch.
pub fn quote_csv<R: Read>(reader: R) -> Result<Vec<BatchQuote>, BatchError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut record = StringRecord::new();
    let mut quotes = Vec::new();

    while csv_reader.read_record(&mut record)? {
        let line = record
            .position()
            .map_or(0, |position| usize::try_from(position.line()).unwrap_or(usize::MAX));
        let request: RawPredictionRequest = record.deserialize(Some(&headers))?;
        let outcome = request.validate().map(QuotedApplicant::from_input);
        quotes.push(BatchQuote { line, outcome });
    }

    Ok(quotes)
}

pub fn quote_csv_path<P: AsRef<Path>>(path: P) -> Result<Vec<BatchQuote>, BatchError> {
    let file = File::open(path)?;
    quote_csv(file)
}
