use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};

use anyhow::{Context as _, Result, bail};
use chrono::{LocalResult, NaiveDateTime};
use chrono_tz::Tz;
use csv::{Reader, ReaderBuilder, StringRecord};
use gas_level::gas::Measurement;

const TIME_INDEX: usize = 0;
const TEMPERATURE_INDEX: usize = 1;
const LEVEL_INDEX: usize = 2;

const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CsvFormat {
    /// `time,temperature,level` with `time` in Unix epoch seconds.
    EpochSeconds,
    /// `measured_at,temperature,level` with `measured_at` in local time.
    LocalDateTime,
}

#[derive(Debug)]
pub struct CsvMeasurementIter<R> {
    reader: Reader<R>,
    format: CsvFormat,
    capacity_liters: u32,
    timezone: Tz,
}

impl<R: Read + Seek> CsvMeasurementIter<R> {
    pub fn new(mut source: R, capacity_liters: u32, timezone: Tz) -> Result<Self> {
        let mut header = String::new();
        BufReader::new(&mut source)
            .read_line(&mut header)
            .context("failed to read CSV header")?;

        let format = detect_format(&header)?;

        source
            .seek(SeekFrom::Start(0))
            .context("failed to seek to start of file")?;
        let reader = ReaderBuilder::new().flexible(true).from_reader(source);

        Ok(Self {
            reader,
            format,
            capacity_liters,
            timezone,
        })
    }
}

impl<R: Read> Iterator for CsvMeasurementIter<R> {
    type Item = Result<Measurement>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = match self.reader.records().next()? {
            Ok(row) => row,
            Err(e) => return Some(Err(e.into())),
        };

        let record = (|| -> Result<Measurement> {
            let raw_time = field(&row, TIME_INDEX, "time")?;
            let time = match self.format {
                CsvFormat::EpochSeconds => raw_time
                    .trim()
                    .parse::<f64>()
                    .with_context(|| format!("failed to parse time: {raw_time}"))?,
                CsvFormat::LocalDateTime => {
                    let naive =
                        NaiveDateTime::parse_from_str(raw_time.trim(), LOCAL_DATETIME_FORMAT)
                            .with_context(|| format!("failed to parse timestamp: {raw_time}"))?;
                    let measured_at = match naive.and_local_timezone(self.timezone) {
                        LocalResult::Single(dt) => dt,
                        LocalResult::Ambiguous(dt, _) => dt,
                        LocalResult::None => bail!("invalid timestamp: {raw_time}"),
                    };
                    measured_at.timestamp() as f64
                }
            };

            let raw_temperature = field(&row, TEMPERATURE_INDEX, "temperature")?;
            let temperature = raw_temperature
                .trim()
                .parse::<f64>()
                .with_context(|| format!("failed to parse temperature: {raw_temperature}"))?
                .trunc() as i32;
            let raw_level = field(&row, LEVEL_INDEX, "level")?;
            let level = raw_level
                .trim()
                .parse::<f64>()
                .with_context(|| format!("failed to parse level: {raw_level}"))?;

            Ok(Measurement::new(
                time,
                temperature,
                level,
                self.capacity_liters,
                self.timezone,
            ))
        })();

        Some(record)
    }
}

fn field<'a>(row: &'a StringRecord, index: usize, name: &str) -> Result<&'a str> {
    row.get(index)
        .with_context(|| format!("missing {name} column in row: {row:?}"))
}

fn detect_format(header: &str) -> Result<CsvFormat> {
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    if columns.len() <= LEVEL_INDEX {
        bail!("CSV header needs time, temperature and level columns: {}", header.trim());
    }
    match columns[TIME_INDEX] {
        "time" => Ok(CsvFormat::EpochSeconds),
        "measured_at" => Ok(CsvFormat::LocalDateTime),
        _ => bail!("unknown CSV header: {}", header.trim()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn iter(content: &str, timezone: Tz) -> CsvMeasurementIter<Cursor<Vec<u8>>> {
        CsvMeasurementIter::new(Cursor::new(content.as_bytes().to_vec()), 300, timezone).unwrap()
    }

    #[test]
    fn detects_formats() {
        assert_eq!(
            detect_format("time,temperature,level\n").unwrap(),
            CsvFormat::EpochSeconds
        );
        assert_eq!(
            detect_format("measured_at,temperature,level\n").unwrap(),
            CsvFormat::LocalDateTime
        );
        assert!(detect_format("Date,Temperature_Celsius(°C)\n").is_err());
        assert!(detect_format("time,level\n").is_err());
    }

    #[test]
    fn rejects_header_without_level_column() {
        let source = Cursor::new(b"time,level\n0,80\n".to_vec());
        assert!(CsvMeasurementIter::new(source, 300, Tz::UTC).is_err());
    }

    #[test]
    fn reports_short_row() {
        let mut rows = iter("time,temperature,level\n0,20\n", Tz::UTC);
        let err = rows.next().unwrap().unwrap_err();
        assert!(format!("{err:#}").contains("missing level column"));
    }

    #[test]
    fn reads_epoch_rows() {
        let rows: Vec<Measurement> = iter(
            "time,temperature,level\n1706040000,21.7,80\n1706126400.5,19,70\n",
            Tz::UTC,
        )
        .collect::<Result<_>>()
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].time, 1_706_040_000.0);
        assert_eq!(rows[0].temperature, 21);
        assert_eq!(rows[0].liters, 240);
        assert_eq!(rows[0].time_as_text, "23-Jan-2024 20:00:00");
        assert_eq!(rows[1].time, 1_706_126_400.5);
        assert_eq!(rows[1].liters, 210);
    }

    #[test]
    fn reads_local_rows() {
        let rows: Vec<Measurement> = iter(
            "measured_at,temperature,level\n2024-01-24 05:00:00,3,55\n",
            chrono_tz::Asia::Tokyo,
        )
        .collect::<Result<_>>()
        .unwrap();

        assert_eq!(rows[0].time, 1_706_040_000.0);
        assert_eq!(rows[0].time_as_text, "24-Jan-2024 05:00:00");
    }

    #[test]
    fn reports_bad_level() {
        let mut rows = iter("time,temperature,level\n0,20,full\n", Tz::UTC);
        let err = rows.next().unwrap().unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse level: full"));
    }
}
