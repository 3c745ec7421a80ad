// 2x2 contingency table for conversion counts
//
// Rows are variants (control, treatment); columns are conversions and
// non-conversions. The chi-square statistic applies Yates' continuity
// correction the way the standard contingency routine does: each observed
// cell moves towards its expected count by at most 0.5, so a cell that
// already matches expectation contributes nothing.

use crate::aggregate::VariantResults;

/// Observed conversion table for two variants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContingencyTable {
    observed: [[f64; 2]; 2],
}

impl ContingencyTable {
    pub fn new(observed: [[u64; 2]; 2]) -> Self {
        Self {
            observed: observed.map(|row| row.map(|cell| cell as f64)),
        }
    }

    /// `[[control conversions, control non-conversions],
    ///   [treatment conversions, treatment non-conversions]]`
    pub fn from_variants(control: &VariantResults, treatment: &VariantResults) -> Self {
        Self::new([
            [control.conversions, control.non_conversions()],
            [treatment.conversions, treatment.non_conversions()],
        ])
    }

    pub fn observed(&self) -> [[f64; 2]; 2] {
        self.observed
    }

    pub fn degrees_of_freedom(&self) -> f64 {
        1.0
    }

    /// Expected counts under independence, or `None` when any is zero
    pub fn expected(&self) -> Option<[[f64; 2]; 2]> {
        let rows = [
            self.observed[0][0] + self.observed[0][1],
            self.observed[1][0] + self.observed[1][1],
        ];
        let cols = [
            self.observed[0][0] + self.observed[1][0],
            self.observed[0][1] + self.observed[1][1],
        ];
        let total = rows[0] + rows[1];

        let mut expected = [[0.0; 2]; 2];
        for (i, row) in rows.iter().enumerate() {
            for (j, col) in cols.iter().enumerate() {
                let e = row * col / total;
                if e.is_nan() || e <= 0.0 {
                    return None;
                }
                expected[i][j] = e;
            }
        }
        Some(expected)
    }

    /// Pearson chi-square statistic with Yates' correction
    ///
    /// Returns `None` when the table has an empty row or column.
    pub fn yates_statistic(&self) -> Option<f64> {
        let expected = self.expected()?;

        let mut statistic = 0.0;
        for i in 0..2 {
            for j in 0..2 {
                let observed = self.observed[i][j];
                let e = expected[i][j];
                let diff = e - observed;
                let corrected = observed + diff.signum() * diff.abs().min(0.5);
                statistic += (corrected - e).powi(2) / e;
            }
        }
        Some(statistic)
    }
}
