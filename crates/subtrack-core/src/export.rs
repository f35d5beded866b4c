//! CSV export of the subscription collection.

use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result, ValidationError};
use crate::subscription::{Subscription, DATE_FORMAT};

/// Default export file name.
pub const EXPORT_FILENAME: &str = "assinaturas.csv";

pub const CSV_HEADER: [&str; 4] = ["Nome", "Valor", "ProximaCobranca", "Categoria"];

/// Render `subs` as CSV text.
///
/// Fields containing a comma, a quote or a line break are quoted, with
/// inner quotes doubled.
///
/// # Errors
/// Returns [`ValidationError::EmptyCollection`] when there is nothing to export.
pub fn to_csv(subs: &[Subscription]) -> Result<String> {
    if subs.is_empty() {
        return Err(ValidationError::EmptyCollection("no subscriptions to export".into()).into());
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for sub in subs {
        writer.write_record([
            sub.name.clone(),
            sub.value.to_string(),
            sub.next_date.format(DATE_FORMAT).to_string(),
            sub.category.clone().unwrap_or_default(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Custom(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CoreError::Custom(e.to_string()))
}

/// Write the CSV into `dir/filename` and return the path.
pub fn write_csv(subs: &[Subscription], dir: &Path, filename: &str) -> Result<PathBuf> {
    let content = to_csv(subs)?;
    let path = dir.join(filename);
    std::fs::write(&path, content)?;
    log::debug!("exported {} subscriptions to {}", subs.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::{parse_next_date, Amount, SubscriptionDraft};

    fn sub(id: i64, name: &str, value: f64, category: Option<&str>) -> Subscription {
        let mut draft = SubscriptionDraft::new(name, value, parse_next_date("2024-01-10").unwrap());
        draft.category = category.map(String::from);
        Subscription::from_draft(id, draft)
    }

    #[test]
    fn header_and_rows() {
        let csv = to_csv(&[sub(1, "Netflix", 39.9, Some("Streaming")), sub(2, "Gym", 80.0, None)]).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "Nome,Valor,ProximaCobranca,Categoria");
        assert_eq!(lines[1], "Netflix,39.90,2024-01-10,Streaming");
        assert_eq!(lines[2], "Gym,80.00,2024-01-10,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn comma_in_name_is_quoted() {
        let csv = to_csv(&[sub(1, "Plan, Pro", 10.0, None)]).unwrap();
        assert!(csv.contains("\"Plan, Pro\",10.00"));
    }

    #[test]
    fn quotes_are_doubled() {
        let csv = to_csv(&[sub(1, "The \"Best\" Plan", 1.0, None)]).unwrap();
        assert!(csv.contains("\"The \"\"Best\"\" Plan\""));
    }

    #[test]
    fn values_round_half_up() {
        let csv = to_csv(&[sub(1, "x", 0.125, None)]).unwrap();
        assert_eq!(csv.lines().nth(1), Some("x,0.13,2024-01-10,"));
    }

    #[test]
    fn raw_value_is_written_as_stored() {
        let mut raw = sub(1, "Legacy", 0.0, None);
        raw.value = Amount::Raw("abc".into());
        let csv = to_csv(&[raw]).unwrap();
        assert_eq!(csv.lines().nth(1), Some("Legacy,abc,2024-01-10,"));
    }

    #[test]
    fn empty_collection_is_rejected() {
        assert!(matches!(
            to_csv(&[]),
            Err(CoreError::Validation(ValidationError::EmptyCollection(_)))
        ));
    }

    #[test]
    fn write_csv_uses_filename() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&[sub(1, "Netflix", 39.9, None)], dir.path(), EXPORT_FILENAME).unwrap();
        assert_eq!(path, dir.path().join("assinaturas.csv"));
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("Nome,Valor"));
    }
}
