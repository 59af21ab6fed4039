use chrono::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
pub mod input;
pub mod plot;
pub mod speed;
pub mod stats;
pub mod window;

pub const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

pub const DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fatal errors, these end the run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("no input file was selected")]
    NoInputSelected,
    #[error("no valid records found in {0}")]
    EmptyDataset(PathBuf),
    #[error("at least two data points are needed for the statistics, found {0}")]
    TooFewPoints(usize),
    #[error("could not draw the chart: {0}")]
    Plot(String),
}

/// Errors of a single csv line, the line is skipped and the parsing continues.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("expected 3 comma-separated fields, found {0}")]
    Fields(usize),
    #[error("invalid download speed: {0}")]
    Download(speed::SpeedError),
    #[error("invalid upload speed: {0}")]
    Upload(speed::SpeedError),
    #[error("invalid timestamp {0:?}: {1}")]
    Timestamp(String, chrono::ParseError),
}

/// One accepted speed test sample, speeds in Mb/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    pub time: NaiveDateTime,
    pub download: f64,
    pub upload: f64,
}

/// Parses a line "timestamp,download,upload".
/// Returns Ok(None) for lines that are valid but filtered out:
/// empty download or download below the threshold.
/// An empty upload is read as zero upload.
pub fn parse_record(line: &str, threshold: f64) -> Result<Option<Record>, RecordError> {
    let fields: Vec<&str> = line.split(',').collect();
    let (time, down, up) = match fields[..] {
        [time, down, up] => (time, down, up),
        _ => return Err(RecordError::Fields(fields.len())),
    };
    if down.is_empty() {
        return Ok(None);
    }
    let download = speed::read_speed(down).map_err(RecordError::Download)?;
    if download < threshold {
        return Ok(None);
    }
    let up = if up.is_empty() { speed::ZERO_SPEED } else { up };
    let upload = speed::read_speed(up).map_err(RecordError::Upload)?;
    let time = NaiveDateTime::parse_from_str(time, DT_FORMAT)
        .map_err(|e| RecordError::Timestamp(time.to_string(), e))?;
    Ok(Some(Record {
        time,
        download,
        upload,
    }))
}

/// The speed test time series, parallel vectors in file order
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub time: Vec<NaiveDateTime>,
    pub download: Vec<f64>,
    pub upload: Vec<f64>,
}

impl Dataset {
    pub fn new(capacity: usize) -> Dataset {
        Dataset {
            time: Vec::with_capacity(capacity),
            download: Vec::with_capacity(capacity),
            upload: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, record: Record) {
        self.time.push(record.time);
        self.download.push(record.download);
        self.upload.push(record.upload);
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// first and last timestamps, in file order
    pub fn span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((*self.time.first()?, *self.time.last()?))
    }

    /// Init a Dataset from csv, without header.
    /// Lines that cannot be parsed are logged and skipped,
    /// an empty result is an error.
    pub fn from_csv(fin: &Path, threshold: f64) -> Result<Dataset, Error> {
        let io_err = |source| Error::Io {
            path: fin.to_path_buf(),
            source,
        };
        let file = File::open(fin).map_err(io_err)?;
        let dataset = Dataset::from_reader(BufReader::new(file), threshold).map_err(io_err)?;
        println!("Read {} lines from {:?}", dataset.len(), fin);
        if dataset.is_empty() {
            return Err(Error::EmptyDataset(fin.to_path_buf()));
        }
        Ok(dataset)
    }

    /// Reads all the lines, line numbers in the logs are 1-based and count every line read.
    /// Lines that are not valid UTF-8 are skipped, any other read error stops the parsing.
    pub fn from_reader<R: BufRead>(buf: R, threshold: f64) -> std::io::Result<Dataset> {
        let mut dataset = Dataset::new(10000);
        for (i, l) in buf.lines().enumerate() {
            let linenum = i + 1;
            let l_unwrap = match l {
                Ok(l_ok) => l_ok,
                Err(l_err) if l_err.kind() == ErrorKind::InvalidData => {
                    warn!("could not read line {}: {}", linenum, l_err);
                    continue;
                }
                Err(l_err) => return Err(l_err),
            };
            match parse_record(&l_unwrap, threshold) {
                Ok(Some(record)) => dataset.push(record),
                Ok(None) => debug!("filtered line {}: {}", linenum, l_unwrap),
                Err(e) => warn!("{}; skipping line {}: {}", e, linenum, l_unwrap),
            }
        }
        Ok(dataset)
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "datetime, download [Mb/s], upload [Mb/s]")?;
        for ((t, d), u) in self.time.iter().zip(&self.download).zip(&self.upload) {
            writeln!(f, "{},{},{}", t.format(DT_FORMAT), d, u)?
        }
        Ok(())
    }
}

/// Panics on an empty slice.
pub fn min_and_max<T: std::cmp::PartialOrd + Copy>(s: &[T]) -> (T, T) {
    let mut self_iter = s.iter();
    let (mut min, mut max) = match self_iter.next() {
        Some(v) => (*v, *v),
        None => panic!("could not iterate over slice"),
    };
    for es in self_iter {
        if *es > max {
            max = *es
        }
        if *es < min {
            min = *es
        }
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_valid_line() {
        let r = parse_record("2023-01-01 10:00:00,95.3 Mb/s,1 Gb/s", 0.)
            .unwrap()
            .unwrap();
        assert_eq!(
            r.time,
            NaiveDate::from_ymd_opt(2023, 1, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap()
        );
        assert!((r.download - 95.3).abs() < 1e-9);
        assert!((r.upload - 1000.).abs() < 1e-9);
    }

    #[test]
    fn empty_download_is_filtered() {
        assert!(parse_record("2023-01-01 10:00:00,,10 Mb/s", 0.)
            .unwrap()
            .is_none());
        assert!(parse_record("garbage,,", 0.).unwrap().is_none());
    }

    #[test]
    fn empty_upload_is_zero() {
        let r = parse_record("2023-01-01 10:00:00,10 Mb/s,", 0.)
            .unwrap()
            .unwrap();
        assert_eq!(r.upload, 0.);
    }

    #[test]
    fn threshold_filters_download() {
        assert!(parse_record("2023-01-01 10:00:00,40 Mb/s,5 Mb/s", 50.)
            .unwrap()
            .is_none());
        assert!(parse_record("2023-01-01 10:00:00,60 Mb/s,5 Mb/s", 50.)
            .unwrap()
            .is_some());
        assert!(parse_record("2023-01-01 10:00:00,50 Mb/s,5 Mb/s", 50.)
            .unwrap()
            .is_some());
    }

    #[test]
    fn malformed_lines_are_errors() {
        assert!(matches!(
            parse_record("2023/01/01 10:00:00,10 Mb/s,5 Mb/s", 0.),
            Err(RecordError::Timestamp(..))
        ));
        assert!(matches!(
            parse_record("2023-01-01 10:00,10 Mb/s,5 Mb/s", 0.),
            Err(RecordError::Timestamp(..))
        ));
        assert!(matches!(
            parse_record("2023-01-01 10:00:00,10 Mb/s", 0.),
            Err(RecordError::Fields(2))
        ));
        assert!(matches!(
            parse_record("2023-01-01 10:00:00,10 Mb/s,5 Mb/s,x", 0.),
            Err(RecordError::Fields(4))
        ));
        assert!(matches!(
            parse_record("2023-01-01 10:00:00,10Mb/s,5 Mb/s", 0.),
            Err(RecordError::Download(_))
        ));
        assert!(matches!(
            parse_record("2023-01-01 10:00:00,10 Mb/s,five Mb/s", 0.),
            Err(RecordError::Upload(_))
        ));
    }

    #[test]
    fn reader_keeps_file_order() {
        let csv = "2023-01-02 10:00:00,20 Mb/s,2 Mb/s\n\
                   2023-01-01 10:00:00,10 Mb/s,1 Mb/s\n\
                   bad line\n\
                   2023-01-03 10:00:00,30 Mb/s,\n";
        let ds = Dataset::from_reader(Cursor::new(csv), 0.).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.download, vec![20., 10., 30.]);
        assert_eq!(ds.upload, vec![2., 1., 0.]);
        let (first, last) = ds.span().unwrap();
        assert_eq!(first.format(DT_FORMAT).to_string(), "2023-01-02 10:00:00");
        assert_eq!(last.format(DT_FORMAT).to_string(), "2023-01-03 10:00:00");
    }

    #[test]
    fn empty_dataset_has_no_span() {
        let ds = Dataset::from_reader(Cursor::new("nothing,here\n"), 0.).unwrap();
        assert!(ds.is_empty());
        assert!(ds.span().is_none());
    }

    #[test]
    fn missing_file_is_io_error() {
        let e = Dataset::from_csv(Path::new("does/not/exist.csv"), 0.).unwrap_err();
        assert!(matches!(e, Error::Io { .. }));
    }

    #[test]
    fn directory_is_io_error() {
        let e = Dataset::from_csv(Path::new(env!("CARGO_MANIFEST_DIR")), 0.).unwrap_err();
        assert!(matches!(e, Error::Io { .. }));
    }

    #[test]
    fn invalid_utf8_line_is_skipped() {
        let mut csv = b"2023-01-01 10:00:00,10 Mb/s,1 Mb/s\n".to_vec();
        csv.extend_from_slice(b"\xff\xfe,1 Mb/s,1 Mb/s\n");
        csv.extend_from_slice(b"2023-01-02 10:00:00,20 Mb/s,2 Mb/s\n");
        let ds = Dataset::from_reader(Cursor::new(csv), 0.).unwrap();
        assert_eq!(ds.download, vec![10., 20.]);
    }

    #[test]
    fn display_lists_records() {
        let ds = Dataset::from_reader(Cursor::new("2023-01-01 10:00:00,10 Mb/s,1 Mb/s\n"), 0.)
            .unwrap();
        assert_eq!(
            ds.to_string(),
            "datetime, download [Mb/s], upload [Mb/s]\n2023-01-01 10:00:00,10,1\n"
        );
    }

    #[test]
    fn min_and_max_of_slice() {
        assert_eq!(min_and_max(&[3., -1., 7., 2.]), (-1., 7.));
    }
}
