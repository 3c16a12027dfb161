//! Edge-driven I2C bitstream reconstruction.
//!
//! Scans the ordered capture samples once, tracking the previous SCL/SDA
//! levels, and emits one token string per capture window:
//!
//! - `[` = start condition
//! - `]` = stop condition
//! - `0`/`1` = data bit sampled on a rising clock edge

use crate::capture::Sample;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Probe {probe} out of range at sample {index}: row has {have} probe values")]
    ProbeOutOfRange { probe: usize, index: u64, have: usize },

    #[error("Bus event at sample {index} before any capture window opened")]
    TokenBeforeWindow { index: u64 },
}

/// Stateful single-pass decoder for one capture.
pub struct BitstreamDecoder {
    probe: usize,
    prev_scl: u8,
    prev_sda: u8,
    windows: Vec<String>,
}

impl BitstreamDecoder {
    /// Create a decoder interpreting the given zero-based probe.
    pub fn new(probe: usize) -> Self {
        // Idle I2C bus: both lines pulled up.
        Self {
            probe,
            prev_scl: 1,
            prev_sda: 1,
            windows: Vec::new(),
        }
    }

    /// Decode all samples, returning one token string per window in
    /// encounter order.
    pub fn decode(mut self, samples: &[Sample]) -> Result<Vec<String>, DecodeError> {
        for sample in samples {
            self.process(sample)?;
        }
        Ok(self.windows)
    }

    fn process(&mut self, sample: &Sample) -> Result<(), DecodeError> {
        if sample.window_sample == 0 {
            debug!(index = sample.index, "new capture window");
            self.windows.push(String::new());
        }

        let busval = sample
            .bus_value(self.probe)
            .ok_or(DecodeError::ProbeOutOfRange {
                probe: self.probe,
                index: sample.index,
                have: sample.probes.len(),
            })?;
        let scl = busval & 1;
        let sda = (busval >> 1) & 1;

        if scl == 1 && self.prev_sda == 1 && sda == 0 {
            self.tokens(sample.index)?.push('[');
        } else if scl == 1 && self.prev_sda == 0 && sda == 1 {
            let tokens = self.tokens(sample.index)?;
            // SDA rising with the clock held high ends a transfer, but that
            // same clock-high interval was already seen as a rising edge and
            // captured a spurious bit. Discard it before marking the stop.
            if tokens.ends_with(['0', '1']) {
                tokens.pop();
            }
            tokens.push(']');
        } else if self.prev_scl == 0 && scl == 1 {
            let bit = if sda == 1 { '1' } else { '0' };
            self.tokens(sample.index)?.push(bit);
        }

        // Edge state deliberately carries across window boundaries; the
        // windows are contiguous slices of one capture, not separate runs.
        self.prev_scl = scl;
        self.prev_sda = sda;
        Ok(())
    }

    /// Token accumulator for the current window. A bus event before the
    /// first window opens means the capture has no window-start marker,
    /// which we refuse to decode rather than silently drop tokens.
    fn tokens(&mut self, index: u64) -> Result<&mut String, DecodeError> {
        self.windows
            .last_mut()
            .ok_or(DecodeError::TokenBeforeWindow { index })
    }
}
