//! Put contract row model.
//!
//! One row per option contract per quote, exactly as stored in a ticker's
//! destination table. Values that were missing or unparseable upstream are
//! stored as the `-99` sentinel in the column's own type, so a row never
//! carries a null.

use serde::{Deserialize, Serialize};

/// Sentinel for missing floating-point values.
pub const SENTINEL_FLOAT: f64 = -99.0;

/// Sentinel for missing 32-bit integer values.
pub const SENTINEL_INT: i32 = -99;

/// Sentinel for missing 64-bit integer values.
pub const SENTINEL_BIGINT: i64 = -99;

/// Sentinel for missing text values.
pub const SENTINEL_TEXT: &str = "-99";

/// Destination column names in storage order.
pub const COLUMNS: [&str; 27] = [
    "put_call",
    "symbol",
    "description",
    "bid",
    "ask",
    "last",
    "bid_size",
    "ask_size",
    "last_size",
    "high_price",
    "low_price",
    "open_price",
    "close_price",
    "total_volume",
    "quote_time",
    "volatility",
    "delta",
    "gamma",
    "theta",
    "vega",
    "rho",
    "open_interest",
    "time_value",
    "theoretical_value",
    "strike_price",
    "expiration_date",
    "dte",
];

/// A normalized put contract quote.
///
/// Field order matches `COLUMNS`. `delta` is stored as a positive magnitude
/// (the upstream value negated).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContractRow {
    /// Contract type, "PUT"
    pub put_call: String,
    /// Option symbol (e.g., "FB_021822P100")
    pub symbol: String,
    pub description: String,
    pub bid: f64,
    pub ask: f64,
    pub last: f64,
    pub bid_size: i32,
    pub ask_size: i32,
    pub last_size: i32,
    pub high_price: f64,
    pub low_price: f64,
    pub open_price: f64,
    pub close_price: f64,
    pub total_volume: i32,
    /// Quote timestamp in epoch milliseconds
    pub quote_time: i64,
    pub volatility: f64,
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
    pub open_interest: i32,
    pub time_value: f64,
    pub theoretical_value: f64,
    pub strike_price: f64,
    /// Expiration timestamp in epoch milliseconds
    pub expiration_date: i64,
    /// Days to expiration
    pub dte: i32,
}

impl ContractRow {
    /// Returns the names of columns holding the sentinel.
    ///
    /// A genuine value of -99 is indistinguishable from a filled one.
    #[must_use]
    pub fn sentinel_columns(&self) -> Vec<&'static str> {
        let text = [
            ("put_call", self.put_call.as_str()),
            ("symbol", self.symbol.as_str()),
            ("description", self.description.as_str()),
        ];
        let floats = [
            ("bid", self.bid),
            ("ask", self.ask),
            ("last", self.last),
            ("high_price", self.high_price),
            ("low_price", self.low_price),
            ("open_price", self.open_price),
            ("close_price", self.close_price),
            ("volatility", self.volatility),
            ("delta", self.delta),
            ("gamma", self.gamma),
            ("theta", self.theta),
            ("vega", self.vega),
            ("rho", self.rho),
            ("time_value", self.time_value),
            ("theoretical_value", self.theoretical_value),
            ("strike_price", self.strike_price),
        ];
        let ints = [
            ("bid_size", i64::from(self.bid_size)),
            ("ask_size", i64::from(self.ask_size)),
            ("last_size", i64::from(self.last_size)),
            ("total_volume", i64::from(self.total_volume)),
            ("quote_time", self.quote_time),
            ("open_interest", i64::from(self.open_interest)),
            ("expiration_date", self.expiration_date),
            ("dte", i64::from(self.dte)),
        ];

        let mut columns: Vec<&'static str> = Vec::new();
        columns.extend(
            text.iter()
                .filter(|(_, v)| *v == SENTINEL_TEXT)
                .map(|(name, _)| *name),
        );
        columns.extend(
            floats
                .iter()
                .filter(|(_, v)| *v == SENTINEL_FLOAT)
                .map(|(name, _)| *name),
        );
        columns.extend(
            ints.iter()
                .filter(|(_, v)| *v == SENTINEL_BIGINT)
                .map(|(name, _)| *name),
        );

        // Report in storage order.
        columns.sort_by_key(|name| COLUMNS.iter().position(|c| c == name));
        columns
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_row() -> ContractRow {
        ContractRow {
            put_call: "PUT".to_string(),
            symbol: "FB_021822P100".to_string(),
            description: "FB Feb 18 2022 100 Put".to_string(),
            bid: 1.5,
            ask: 1.6,
            last: SENTINEL_FLOAT,
            bid_size: 10,
            ask_size: 12,
            last_size: 0,
            high_price: 0.0,
            low_price: 0.0,
            open_price: 0.0,
            close_price: 1.55,
            total_volume: 0,
            quote_time: 1000,
            volatility: 48.2,
            delta: 0.32,
            gamma: 0.01,
            theta: -0.05,
            vega: 0.2,
            rho: -0.03,
            open_interest: 150,
            time_value: 1.55,
            theoretical_value: 1.55,
            strike_price: 100.0,
            expiration_date: 2000,
            dte: 45,
        }
    }

    #[test]
    fn test_columns_are_unique() {
        let mut sorted = COLUMNS.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 27);
    }

    #[test]
    fn test_sentinel_columns() {
        let mut row = sample_row();
        assert_eq!(row.sentinel_columns(), vec!["last"]);

        row.description = SENTINEL_TEXT.to_string();
        row.dte = SENTINEL_INT;
        assert_eq!(row.sentinel_columns(), vec!["description", "last", "dte"]);
    }

    #[test]
    fn test_serializes_with_column_names() {
        let json = serde_json::to_value(sample_row()).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), COLUMNS.len());
        for column in COLUMNS {
            assert!(object.contains_key(column), "missing {column}");
        }
    }
}
