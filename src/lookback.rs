use ndarray::Array2;
use rayon::prelude::*;

use crate::record::{TempChange, TempRecord};

/// The number of flags describing each previous record.
pub const INPUTS_PER_RECORD: usize = 2;
/// The number of classes a target record falls in.
pub const OUTPUTS: usize = 3;

/// A record paired with the ones that came right before it.
#[derive(Debug, Clone, PartialEq)]
pub struct TempRecordLookback {
    pub target: TempRecord,
    pub previous: Vec<TempRecord>,
}

impl TempRecordLookback {
    pub fn new(target: TempRecord, previous: Vec<TempRecord>) -> Self {
        Self { target, previous }
    }

    /// The `[rose, fell]` flags of every previous record, newest first.
    pub fn inputs(&self) -> Vec<f32> {
        let mut previous: Vec<_> = self.previous.iter().collect();
        previous.sort_by(|a, b| b.rec_time.cmp(&a.rec_time));

        previous
            .into_iter()
            .flat_map(|record| {
                let change = record.temp_change();
                [flag(change == TempChange::Rose), flag(change == TempChange::Fell)]
            })
            .collect()
    }

    /// The target's change one-hot encoded as `[fell, flat, rose]`.
    pub fn outputs(&self) -> [f32; OUTPUTS] {
        let change = self.target.temp_change();

        [
            flag(change == TempChange::Fell),
            flag(change == TempChange::Flat),
            flag(change == TempChange::Rose),
        ]
    }
}

fn flag(set: bool) -> f32 {
    if set { 1. } else { 0. }
}

/// Pairs every record with the `window` records preceding it.
///
/// # Returns
/// One lookback per record, newest target first. The oldest targets get shorter histories.
pub fn build_lookbacks(records: &[TempRecord], window: usize) -> Vec<TempRecordLookback> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.rec_time.cmp(&a.rec_time));

    (0..sorted.len())
        .into_par_iter()
        .map(|i| {
            let previous = sorted.iter().skip(i + 1).take(window).cloned().collect();
            TempRecordLookback::new(sorted[i].clone(), previous)
        })
        .collect()
}

/// Stacks the lookbacks into feature and target matrices.
///
/// Only the rows as wide as the first lookback's are kept.
///
/// # Returns
/// The `(inputs, outputs)` matrices or `None` if the first lookback has no history.
pub fn to_training_arrays(
    lookbacks: &[TempRecordLookback],
) -> Option<(Array2<f32>, Array2<f32>)> {
    let rows: Vec<(Vec<f32>, [f32; OUTPUTS])> = lookbacks
        .par_iter()
        .map(|lookback| (lookback.inputs(), lookback.outputs()))
        .collect();

    let input_count = rows.first()?.0.len();
    if input_count == 0 {
        return None;
    }

    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    for (x, y) in rows.iter().filter(|(x, _)| x.len() == input_count) {
        inputs.extend_from_slice(x);
        outputs.extend_from_slice(y);
    }

    let count = inputs.len() / input_count;
    let x = Array2::from_shape_vec((count, input_count), inputs).ok()?;
    let y = Array2::from_shape_vec((count, OUTPUTS), outputs).ok()?;

    Some((x, y))
}
