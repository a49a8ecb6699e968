//! Gap detector.
//!
//! Finds runs of consecutive out-of-range readings that are closed off by an
//! obstacle reading on the far side.

pub use crate::core::MIN_RUN_LENGTH;
use crate::core::{CandidateRun, Reading, Sweep};

/// Extract candidate runs from a sweep, in angle order.
///
/// The buffer is cleared on every measured reading, so runs never overlap and
/// short runs are dropped rather than joined with later ones. A run still open
/// when the sweep ends has no confirmed far edge and is not reported.
pub fn find_runs(sweep: &Sweep) -> Vec<CandidateRun> {
    let mut runs = Vec::new();
    let mut buf: Vec<Reading> = Vec::new();

    for reading in sweep.readings() {
        if reading.distance.is_out_of_range() {
            buf.push(*reading);
            continue;
        }

        if buf.len() >= MIN_RUN_LENGTH {
            let readings = std::mem::take(&mut buf);
            if let Some(run) = CandidateRun::new(readings, sweep.horizon()) {
                runs.push(run);
            }
        } else {
            buf.clear();
        }
    }

    if !buf.is_empty() {
        log::debug!(
            "Discarding {} open readings at end of sweep (from {:.1}°)",
            buf.len(),
            buf[0].angle
        );
    }

    runs
}
