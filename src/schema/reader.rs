//! CSV reader producing raw survey rows
//!
//! The reader only checks that every configured column exists in the header
//! row. Cell contents are decoded lossily and otherwise passed through
//! untouched; shaping them is the normalizer's job.

use crate::error::PulseError;
use crate::schema::columns::{ColumnMap, RawRow};
use std::io::Read;
use std::path::Path;

/// Reader for comma-delimited survey exports
pub struct SurveyReader;

impl SurveyReader {
    /// Read every row of the CSV file at `path`
    pub fn from_path(path: &Path, columns: &ColumnMap) -> Result<Vec<RawRow>, PulseError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, columns)
    }

    /// Read every row of an in-memory CSV document
    pub fn parse_str(csv_data: &str, columns: &ColumnMap) -> Result<Vec<RawRow>, PulseError> {
        Self::from_reader(csv_data.as_bytes(), columns)
    }

    /// Read every row from `source`, preserving input order
    pub fn from_reader<R: Read>(source: R, columns: &ColumnMap) -> Result<Vec<RawRow>, PulseError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(source);

        let headers: Vec<String> = reader.byte_headers()?.iter().map(decode_field).collect();
        for (field, header) in columns.entries() {
            if !headers.iter().any(|h| h == header) {
                return Err(PulseError::MissingColumn(format!("{field} ({header})")));
            }
        }

        let mut rows = Vec::new();
        for (line, result) in reader.byte_records().enumerate() {
            let record = result?;
            // Short rows leave trailing questions absent; the normalizer treats absent as empty
            let row: RawRow = headers
                .iter()
                .map(String::as_str)
                .zip(record.iter().map(decode_field))
                .collect();
            tracing::trace!(line = line + 2, fields = row.len(), "read survey row");
            rows.push(row);
        }

        tracing::debug!(rows = rows.len(), "loaded survey rows");
        Ok(rows)
    }
}

/// Lossy UTF-8 decode; invalid bytes become U+FFFD
fn decode_field(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::Normalizer;
    use crate::schema::columns::*;
    use crate::types::{Gender, TimeBucket};

    fn header() -> String {
        ColumnMap::default()
            .entries()
            .iter()
            .map(|(_, h)| format!("\"{h}\""))
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn test_reads_rows_in_order() {
        let csv_data = format!(
            "{}\n21,Male,\"YouTube, Discord\",Less than an Hour,3,4\n35,Female,Instagram,More than 5 hours,5,5\n",
            header()
        );
        let rows = SurveyReader::parse_str(&csv_data, &ColumnMap::default()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(AGE_COLUMN), "21");
        assert_eq!(rows[0].get(PLATFORMS_COLUMN), "YouTube, Discord");
        assert_eq!(rows[1].get(TIME_SPENT_COLUMN), "More than 5 hours");
    }

    #[test]
    fn test_short_row_is_tolerated() {
        let csv_data = format!("{}\n40,Female\n", header());
        let rows = SurveyReader::parse_str(&csv_data, &ColumnMap::default()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(GENDER_COLUMN), "Female");
        assert_eq!(rows[0].get(DEPRESSION_COLUMN), "");
    }

    #[test]
    fn test_invalid_utf8_keeps_every_row() {
        let mut csv_data = format!("{}\n21,Male,YouTube,Less than an Hour,3,4\n", header()).into_bytes();
        csv_data.extend_from_slice(b"22,M\xffle,YouTube,More than 5 hours,2,5\n");

        let rows = SurveyReader::from_reader(csv_data.as_slice(), &ColumnMap::default()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get(GENDER_COLUMN), "M\u{fffd}le");
        assert_eq!(rows[1].get(AGE_COLUMN), "22");

        let records = Normalizer::normalize(&rows, &ColumnMap::default());
        assert_eq!(records[0].gender, Gender::Male);
        assert_eq!(records[1].gender, Gender::Unknown);
        assert_eq!(records[1].time_bucket, TimeBucket::SixHoursPlus);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let result = SurveyReader::parse_str("Age,Gender\n20,Male\n", &ColumnMap::default());
        assert!(matches!(result, Err(PulseError::MissingColumn(_))));
    }
}
