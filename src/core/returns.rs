//! Simple daily returns from an aligned price table.

use crate::core::align::AlignedPriceTable;
use chrono::NaiveDate;
use tracing::debug;

/// Complete simple returns: every retained row has a value for every instrument.
///
/// `dates[t]` is the later of the two closes that produced row `t`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnTable {
    pub dates: Vec<NaiveDate>,
    pub instruments: Vec<String>,
    pub columns: Vec<Vec<f64>>,
}

impl ReturnTable {
    pub fn rows(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn row(&self, t: usize) -> Vec<f64> {
        self.columns.iter().map(|col| col[t]).collect()
    }
}

/// `price_t / price_{t-1} - 1`, or `None` when either close is absent or the
/// ratio is not a finite number (including a zero previous close).
fn simple_return(prev: Option<f64>, curr: Option<f64>) -> Option<f64> {
    let (prev, curr) = (prev?, curr?);
    if prev == 0.0 {
        return None;
    }
    let r = curr / prev - 1.0;
    r.is_finite().then_some(r)
}

pub fn compute_returns(table: &AlignedPriceTable) -> ReturnTable {
    let raw: Vec<Vec<Option<f64>>> = table
        .columns
        .iter()
        .map(|col| {
            col.windows(2)
                .map(|pair| simple_return(pair[0], pair[1]))
                .collect()
        })
        .collect();

    let mut result = ReturnTable {
        dates: Vec::new(),
        instruments: table.instruments.clone(),
        columns: vec![Vec::new(); table.columns.len()],
    };

    // Row t of `raw` is the return ending on dates[t + 1]; the first date never yields one.
    let candidate_rows = table.len().saturating_sub(1);
    for t in 0..candidate_rows {
        let row: Option<Vec<f64>> = raw.iter().map(|col| col[t]).collect();
        match row {
            Some(values) => {
                result.dates.push(table.dates[t + 1]);
                for (column, value) in result.columns.iter_mut().zip(values) {
                    column.push(value);
                }
            }
            None => debug!("Dropping return row for {}", table.dates[t + 1]),
        }
    }

    debug!(
        "Computed {} complete return rows out of {} candidates",
        result.rows(),
        candidate_rows
    );
    result
}
