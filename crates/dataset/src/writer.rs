//! Dataset persistence.
//!
//! Writes training samples as a delimited text file with a header row:
//! position-named feature columns `f0..f(3H-1)` plus a categorical `target`.

use sessionlab_core::{Result, TrainingSample};
use std::io::Write;
use std::path::Path;

/// Write samples to any writer as CSV with a header row.
///
/// `history` fixes the column count; samples are expected to carry
/// `3 × history` features each.
pub fn write_samples<W: Write>(writer: W, samples: &[TrainingSample], history: usize) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = (0..history * 3).map(|i| format!("f{i}")).collect();
    header.push("target".to_string());
    out.write_record(&header)?;

    for sample in samples {
        let mut record: Vec<String> = sample.features.iter().map(|v| v.to_string()).collect();
        record.push(sample.target.as_str().to_string());
        out.write_record(&record)?;
    }
    out.flush().map_err(sessionlab_core::Error::Io)?;
    Ok(())
}

/// Write samples to a file path.
pub fn write_samples_to_path(
    path: impl AsRef<Path>,
    samples: &[TrainingSample],
    history: usize,
) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_samples(file, samples, history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sessionlab_core::SessionState;

    fn sample(base: f64, target: SessionState) -> TrainingSample {
        TrainingSample {
            features: vec![base, base + 0.5, base + 1.0, base + 1.5, base + 2.0, base + 2.5],
            target,
        }
    }

    #[test]
    fn test_header_and_rows() {
        let samples = vec![
            sample(1.0, SessionState::Trend),
            sample(2.0, SessionState::Range),
        ];
        let mut buf = Vec::new();
        write_samples(&mut buf, &samples, 2).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "f0,f1,f2,f3,f4,f5,target");
        assert_eq!(lines[1], "1,1.5,2,2.5,3,3.5,trend");
        assert_eq!(lines[2], "2,2.5,3,3.5,4,4.5,range");
    }

    #[test]
    fn test_empty_samples_still_write_header() {
        let mut buf = Vec::new();
        write_samples(&mut buf, &[], 3).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("f0,"));
        assert!(text.trim_end().ends_with("f8,target"));
    }

    #[test]
    fn test_write_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("training.csv");
        write_samples_to_path(&path, &[sample(3.0, SessionState::Trend)], 2).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("trend"));
    }
}
