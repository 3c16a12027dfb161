//! ILA waveform CSV parsing.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::path::Path;

/// One retained row of an ILA CSV export.
///
/// Column layout: `sample_index, window_sample, trigger, probe_values...`.
/// Each probe value is two bits wide: bit 0 is SCL, bit 1 is SDA.
#[derive(Debug, Clone)]
pub struct Sample {
    pub index: u64,
    /// Sample position within the capture window; `0` opens a new window.
    pub window_sample: u64,
    #[expect(dead_code, reason = "Column present in every ILA export row")]
    pub trigger: u64,
    pub probes: Vec<u8>,
}

impl Sample {
    /// Bus value for the given probe, or `None` if the capture has fewer
    /// probe columns than that.
    pub fn bus_value(&self, probe: usize) -> Option<u8> {
        self.probes.get(probe).copied()
    }
}

/// CSV capture reader
pub struct CaptureReader {
    reader: csv::Reader<std::fs::File>,
}

impl CaptureReader {
    /// Open an ILA CSV export
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())
            .with_context(|| format!("Failed to open capture file: {:?}", path.as_ref()))?;
        // ILA exports interleave metadata rows with data rows and the probe
        // column count varies per capture, so read flexibly and filter below.
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);
        Ok(Self { reader })
    }

    /// Read and parse samples, dropping header/metadata rows.
    pub fn samples(&mut self) -> impl Iterator<Item = Result<Sample>> + '_ {
        self.reader
            .records()
            .enumerate()
            .filter_map(|(row, result)| match result {
                Ok(record) => {
                    if is_header_row(&record) {
                        None
                    } else {
                        Some(
                            parse_sample(&record)
                                .with_context(|| format!("Invalid capture row {}", row + 1)),
                        )
                    }
                }
                Err(e) => Some(Err(e.into())),
            })
    }
}

/// ILA exports prefix metadata rows with `Radix` or `Sample` in the first
/// column (case-sensitive, as written by the tool).
fn is_header_row(record: &csv::StringRecord) -> bool {
    record
        .get(0)
        .is_some_and(|f| f.starts_with("Radix") || f.starts_with("Sample"))
}

fn parse_sample(record: &csv::StringRecord) -> Result<Sample> {
    let fields: Vec<u64> = record
        .deserialize(None)
        .context("Non-integer field in data row")?;
    let [index, window_sample, trigger, probes @ ..] = fields.as_slice() else {
        anyhow::bail!("Expected at least 3 columns, got {}", fields.len());
    };
    Ok(Sample {
        index: *index,
        window_sample: *window_sample,
        trigger: *trigger,
        probes: probes.iter().map(|&v| v as u8).collect(),
    })
}

#[cfg(test)]
mod capture_tests {
    use super::*;

    fn record(fields: &[&str]) -> csv::StringRecord {
        csv::StringRecord::from(fields.to_vec())
    }

    #[test]
    fn header_rows_are_dropped() {
        assert!(is_header_row(&record(&["Radix - UNSIGNED", "", ""])));
        assert!(is_header_row(&record(&[
            "Sample in Buffer",
            "Sample in Window",
            "TRIGGER"
        ])));
        assert!(!is_header_row(&record(&["0", "0", "1", "3"])));
    }

    #[test]
    fn data_row_parses_probes() {
        let sample = parse_sample(&record(&["17", "0", "1", "3", "2"])).unwrap();
        assert_eq!(sample.index, 17);
        assert_eq!(sample.window_sample, 0);
        assert_eq!(sample.trigger, 1);
        assert_eq!(sample.probes, vec![3, 2]);
        assert_eq!(sample.bus_value(1), Some(2));
        assert_eq!(sample.bus_value(2), None);
    }

    #[test]
    fn non_integer_field_is_an_error() {
        assert!(parse_sample(&record(&["0", "0", "x", "3"])).is_err());
    }

    #[test]
    fn short_row_is_an_error() {
        assert!(parse_sample(&record(&["0", "0"])).is_err());
    }

    #[test]
    fn reads_file_skipping_headers() {
        let path = std::env::temp_dir().join("i2c_ila_dissect_capture_test.csv");
        std::fs::write(
            &path,
            "Radix - UNSIGNED,UNSIGNED,UNSIGNED,HEX\n\
             Sample in Buffer,Sample in Window,TRIGGER,probe0\n\
             0,0,1,3\n\
             1,1,1,1\n",
        )
        .unwrap();
        let mut reader = CaptureReader::open(&path).unwrap();
        let samples = reader.samples().collect::<Result<Vec<_>>>().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].probes, vec![3]);
        assert_eq!(samples[1].bus_value(0), Some(1));
    }
}
