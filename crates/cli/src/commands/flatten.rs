//! Offline flatten command.
//!
//! Reads a chain response saved from the chains endpoint and writes the
//! normalized rows as CSV, exactly as they would be loaded.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chain_etl_data::{ContractRow, COLUMNS};
use chain_etl_pipeline::flatten;
use chain_etl_tda::RawChainResponse;
use clap::Args;
use csv::WriterBuilder;

/// Arguments for the flatten command.
#[derive(Args, Debug, Clone)]
pub struct FlattenArgs {
    /// Saved chain response (JSON)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output CSV file path (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Writes rows as CSV with the storage column names as header.
///
/// The header is written even when there are no rows.
///
/// # Errors
/// Returns an error if writing fails.
pub fn write_csv<W: Write>(writer: W, rows: &[ContractRow]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);

    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Runs the flatten command.
///
/// # Errors
/// Returns an error if the input cannot be read or parsed, the chain is
/// malformed, or the output cannot be written.
pub fn run_flatten(args: FlattenArgs) -> Result<()> {
    let body = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let raw = RawChainResponse::from_slice(&body)
        .with_context(|| format!("{} is not a chain response", args.input.display()))?;

    if !raw.is_success() {
        tracing::warn!(
            status = raw.status.as_deref().unwrap_or_default(),
            "Saved response reports non-success status"
        );
    }

    let rows = flatten(&raw)?;
    let sentinel_cells: usize = rows.iter().map(|r| r.sentinel_columns().len()).sum();
    tracing::info!(rows = rows.len(), sentinel_cells, "Chain flattened");

    match &args.output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
            write_csv(file, &rows)?;
            tracing::info!("Wrote {} rows to {}", rows.len(), path.display());
        }
        None => write_csv(std::io::stdout().lock(), &rows)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chain_json() -> serde_json::Value {
        json!({
            "symbol": "FB",
            "status": "SUCCESS",
            "putExpDateMap": {
                "2022-02-18:45": {
                    "100.0": [{
                        "putCall": "PUT",
                        "symbol": "FB_021822P100",
                        "description": "FB Feb 18 2022 100 Put",
                        "bid": "1.5",
                        "ask": "1.6",
                        "last": "NaN",
                        "delta": "-0.32",
                        "quoteTimeInLong": 1000,
                        "strikePrice": "100.0",
                        "expirationDate": 2000,
                        "daysToExpiration": 45
                    }]
                }
            }
        })
    }

    #[test]
    fn test_write_csv_header_only_when_empty() {
        let mut out = Vec::new();
        write_csv(&mut out, &[]).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.trim_end(), COLUMNS.join(","));
    }

    #[test]
    fn test_run_flatten_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("fb.json");
        let output = dir.path().join("fb.csv");
        std::fs::write(&input, chain_json().to_string()).unwrap();

        run_flatten(FlattenArgs {
            input,
            output: Some(output.clone()),
        })
        .unwrap();

        let mut reader = csv::Reader::from_path(&output).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 27);

        let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(records.len(), 1);

        let field = |name: &str| {
            let idx = headers.iter().position(|h| h == name).unwrap();
            records[0][idx].to_string()
        };
        assert_eq!(field("symbol"), "FB_021822P100");
        assert_eq!(field("last").parse::<f64>().unwrap(), -99.0);
        assert_eq!(field("delta").parse::<f64>().unwrap(), 0.32);
        assert_eq!(field("quote_time"), "1000");
        assert_eq!(field("bid_size"), "-99");
    }

    #[test]
    fn test_run_flatten_rejects_malformed_chain() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.json");
        std::fs::write(&input, r#"{"putExpDateMap": {"2022-02-18:45": []}}"#).unwrap();

        let err = run_flatten(FlattenArgs {
            input,
            output: Some(dir.path().join("bad.csv")),
        })
        .unwrap_err();

        assert!(err.to_string().contains("2022-02-18:45"));
    }

    #[test]
    fn test_run_flatten_missing_input() {
        let err = run_flatten(FlattenArgs {
            input: PathBuf::from("/nonexistent/chain.json"),
            output: None,
        })
        .unwrap_err();

        assert!(err.to_string().contains("Failed to read"));
    }
}
