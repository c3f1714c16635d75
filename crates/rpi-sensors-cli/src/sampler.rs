//! Trimmed-mean sampling of noisy sensors.
//!
//! Takes N readings, sorts them and drops the lowest and highest third
//! before averaging. Fewer than four readings are averaged as-is.

use crate::measurement::Value;
use std::time::Duration;
use thiserror::Error;

/// Sampling errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleError {
    /// The sample count was zero.
    #[error("Sample count must be at least 1")]
    InvalidArgument,
}

/// Averages `values` after dropping `len / 3` values from each end.
///
/// Returns `None` for an empty slice.
pub fn trimmed_mean(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let count = values.len();
    let cut = if count > 3 { count / 3 } else { 0 };
    let kept = &values[cut..count - cut];
    Some(kept.iter().sum::<f64>() / kept.len() as f64)
}

/// Calls `read_one` `count` times, pausing `delay` in between, and returns
/// the trimmed mean.
///
/// `Ok(None)` means at least one reading was not a number.
pub fn sample<E>(
    mut read_one: impl FnMut() -> Result<Value, E>,
    count: usize,
    delay: Duration,
) -> Result<Option<f64>, E>
where
    E: From<SampleError>,
{
    if count == 0 {
        return Err(SampleError::InvalidArgument.into());
    }

    let mut values = Vec::with_capacity(count);
    let mut numeric = true;
    for i in 0..count {
        if i > 0 {
            pause(delay);
        }
        match read_one()?.as_number() {
            Some(n) => values.push(n),
            None => numeric = false,
        }
    }

    Ok(if numeric { trimmed_mean(&mut values) } else { None })
}

/// Element-wise [`sample`] for sensors that report several channels per read.
///
/// The channel count is taken from the first read. A channel that is ever
/// missing or non-numeric averages to `None`.
pub fn sample_channels<E>(
    mut read_one: impl FnMut() -> Result<Vec<Value>, E>,
    count: usize,
    delay: Duration,
) -> Result<Vec<Option<f64>>, E>
where
    E: From<SampleError>,
{
    if count == 0 {
        return Err(SampleError::InvalidArgument.into());
    }

    let mut columns: Vec<Vec<f64>> = Vec::new();
    let mut numeric: Vec<bool> = Vec::new();
    for i in 0..count {
        if i > 0 {
            pause(delay);
        }
        let row = read_one()?;
        if i == 0 {
            columns = vec![Vec::with_capacity(count); row.len()];
            numeric = vec![true; row.len()];
        }
        for (channel, column) in columns.iter_mut().enumerate() {
            match row.get(channel).and_then(Value::as_number) {
                Some(n) => column.push(n),
                None => numeric[channel] = false,
            }
        }
    }

    Ok(columns
        .iter_mut()
        .zip(numeric)
        .map(|(column, ok)| if ok { trimmed_mean(column) } else { None })
        .collect())
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}
