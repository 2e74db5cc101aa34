use serde::Serialize;
use std::f64::consts::TAU;

use crate::expense::Expense;

/// Angular extent of a slice, in radians
///
/// Angles start at 12 o'clock and grow clockwise.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Angles {
    pub start: f64,
    pub end: f64,
}

impl Angles {
    pub fn new(start: f64, end: f64) -> Self {
        Angles { start, end }
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// Linear interpolation between two extents, `t` in `[0, 1]`
    pub fn lerp(&self, to: &Angles, t: f64) -> Angles {
        Angles {
            start: self.start + (to.start - self.start) * t,
            end: self.end + (to.end - self.end) * t,
        }
    }
}

/// One record laid out on the circle
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PieSlice {
    /// Position of the record in the mirror
    pub index: usize,

    /// Value the slice is sized by
    pub value: u64,

    pub angles: Angles,

    pub expense: Expense,
}

/// Lays the records out on a full circle, sized by cost
///
/// Records keep their order. When every cost is zero all slices collapse to
/// zero width at the starting angle.
pub fn pie_layout(expenses: &[Expense]) -> Vec<PieSlice> {
    let total: u128 = expenses.iter().map(|e| u128::from(e.cost)).sum();
    let scale = if total > 0 { TAU / total as f64 } else { 0.0 };

    let mut start = 0.0;
    expenses
        .iter()
        .enumerate()
        .map(|(index, expense)| {
            let end = start + expense.cost as f64 * scale;
            let slice = PieSlice {
                index,
                value: expense.cost,
                angles: Angles::new(start, end),
                expense: expense.clone(),
            };
            start = end;
            slice
        })
        .collect()
}
