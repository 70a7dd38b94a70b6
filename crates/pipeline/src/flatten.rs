//! Flattens a put chain into contract rows.
//!
//! The put map nests expiration label → strike label → list of contract
//! objects. Every contract object becomes exactly one `ContractRow`; the
//! labels themselves are not carried into the row (each contract repeats its
//! strike and expiration as fields).
//!
//! Scalar fields are coerced per column type. Anything missing, null, or
//! unparseable is filled with the `-99` sentinel; only a broken nesting
//! shape is an error.

use chain_etl_data::{
    ContractRow, SENTINEL_BIGINT, SENTINEL_FLOAT, SENTINEL_INT, SENTINEL_TEXT,
};
use chain_etl_tda::RawChainResponse;
use serde_json::{Map, Value};

use crate::error::NormalizeError;

type Record = Map<String, Value>;

/// Flattens the put map of a chain response into rows.
///
/// An empty put map yields no rows.
///
/// # Errors
/// Returns `NormalizeError::MissingPutMap` if the response has no put map,
/// and `NormalizeError::Structure` if any nesting level has the wrong type.
pub fn flatten(raw: &RawChainResponse) -> Result<Vec<ContractRow>, NormalizeError> {
    let put_map = raw
        .put_exp_date_map
        .as_ref()
        .ok_or(NormalizeError::MissingPutMap)?;

    let mut rows = Vec::new();
    for (expiration, strikes) in put_map {
        let strikes = strikes
            .as_object()
            .ok_or_else(|| NormalizeError::structure(expiration, "expected an object of strikes"))?;

        for (strike, contracts) in strikes {
            let contracts = contracts.as_array().ok_or_else(|| {
                NormalizeError::structure(
                    format!("{expiration}/{strike}"),
                    "expected a list of contracts",
                )
            })?;

            for (index, contract) in contracts.iter().enumerate() {
                let record = contract.as_object().ok_or_else(|| {
                    NormalizeError::structure(
                        format!("{expiration}/{strike}[{index}]"),
                        "expected a contract object",
                    )
                })?;
                rows.push(normalize_contract(record));
            }
        }
    }

    Ok(rows)
}

/// Selects, coerces, and sentinel-fills one contract record.
///
/// Each column reads one upstream field (`quoteTimeInLong` → `quote_time`,
/// `theoreticalOptionValue` → `theoretical_value`, `daysToExpiration` →
/// `dte`, the rest by snake-casing). Other fields are ignored.
#[must_use]
pub fn normalize_contract(record: &Record) -> ContractRow {
    let text = |name: &str| {
        coerce_text(record.get(name)).unwrap_or_else(|| SENTINEL_TEXT.to_string())
    };
    let float = |name: &str| coerce_float(record.get(name)).unwrap_or(SENTINEL_FLOAT);
    let int = |name: &str| coerce_i32(record.get(name)).unwrap_or(SENTINEL_INT);
    let bigint = |name: &str| coerce_i64(record.get(name)).unwrap_or(SENTINEL_BIGINT);

    ContractRow {
        put_call: text("putCall"),
        symbol: text("symbol"),
        description: text("description"),
        bid: float("bid"),
        ask: float("ask"),
        last: float("last"),
        bid_size: int("bidSize"),
        ask_size: int("askSize"),
        last_size: int("lastSize"),
        high_price: float("highPrice"),
        low_price: float("lowPrice"),
        open_price: float("openPrice"),
        close_price: float("closePrice"),
        total_volume: int("totalVolume"),
        quote_time: bigint("quoteTimeInLong"),
        volatility: float("volatility"),
        // Puts are quoted with non-positive delta; store the magnitude.
        delta: coerce_float(record.get("delta"))
            .map(|delta| 0.0 - delta)
            .unwrap_or(SENTINEL_FLOAT),
        gamma: float("gamma"),
        theta: float("theta"),
        vega: float("vega"),
        rho: float("rho"),
        open_interest: int("openInterest"),
        time_value: float("timeValue"),
        theoretical_value: float("theoreticalOptionValue"),
        strike_price: float("strikePrice"),
        expiration_date: bigint("expirationDate"),
        dte: int("daysToExpiration"),
    }
}

fn coerce_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Parses a float; "NaN" in any case, empty strings, and non-finite
/// results are missing.
fn coerce_float(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float(s),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

fn parse_float(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Parses an integer, truncating fractional input toward zero.
fn coerce_i64(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().and_then(|u| i64::try_from(u).ok()))
            .or_else(|| n.as_f64().and_then(truncate_f64)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .ok()
            .or_else(|| parse_float(s).and_then(truncate_f64)),
        _ => None,
    }
}

fn coerce_i32(value: Option<&Value>) -> Option<i32> {
    coerce_i64(value).and_then(|v| i32::try_from(v).ok())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn truncate_f64(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}
