use std::fmt;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use log::{debug, info, warn};
use serde::Serialize;
use crate::aggregator::fold;
use crate::cursor::{Scan, StreamCursor};
use crate::decoder::{decode_next, decode_resumed, ENTRY_KEY};
use crate::errors::{DecodeError, ExtractError};
use crate::models::forecast::{
    CurrentReading, DailyAggregate, ForecastEntry, HourlySlot, HUMIDITY, PRESSURE,
    RAIN_PROBABILITY, TEMPERATURE, WIND_DIRECTION, WIND_SPEED,
};

/// Literal that opens the array of forecast entries in an SMHI point forecast
pub const ARRAY_MARKER: &str = r#""timeSeries":["#;

/// Number of days after today that get an aggregate
pub const TARGET_DAYS: usize = 6;

/// Labels and hours of the intraday slots
pub const TARGET_HOURS: [(&str, u32); 3] = [("Morning", 8), ("Noon", 13), ("Evening", 19)];

/// Bounds on the work a single pass may do
#[derive(Debug, Clone)]
pub struct Limits {
    pub max_entries: usize,
    pub max_decode_errors: usize,
    pub max_elapsed: Duration,
    /// Extra attempts when the stream is starved while looking for a delimiter or marker
    pub starve_retries: usize,
    pub starve_pause: Duration,
    /// Entries between calls to the caller's chunk callback
    pub chunk_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_entries: 500,
            max_decode_errors: 10,
            max_elapsed: Duration::from_secs(30),
            starve_retries: 3,
            starve_pause: Duration::from_millis(50),
            chunk_size: 25,
        }
    }
}

/// Why a pass stopped
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitReason {
    #[default]
    NotStarted,
    DaysComplete,
    EntryLimit,
    ErrorLimit,
    Deadline,
    EndOfArray,
    EndOfStream,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExitReason::NotStarted  => write!(f, "not started"),
            ExitReason::DaysComplete => write!(f, "all days collected"),
            ExitReason::EntryLimit  => write!(f, "entry limit reached"),
            ExitReason::ErrorLimit  => write!(f, "decode error limit reached"),
            ExitReason::Deadline    => write!(f, "deadline passed"),
            ExitReason::EndOfArray  => write!(f, "end of forecast array"),
            ExitReason::EndOfStream => write!(f, "end of stream"),
        }
    }
}

/// Bookkeeping of a pass, handed to the chunk callback and kept in the report
#[derive(Serialize, Debug, Clone, Default)]
pub struct PassStats {
    pub entries: usize,
    pub decoded: usize,
    pub malformed: usize,
    pub unusable: usize,
    pub starved_retries: usize,
    pub days_collected: usize,
    pub elapsed_ms: u64,
    pub exit: ExitReason,
}

/// Accumulator state owned by exactly one extraction pass
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    pub current: CurrentReading,
    pub hourly: [HourlySlot; 3],
    pub daily: [DailyAggregate; TARGET_DAYS],
    pub stats: PassStats,
    first_date: Option<String>,
    previous_date: Option<String>,
    day_index: usize,
}

impl ExtractionContext {
    /// Returns a context with every accumulator empty and invalid
    pub fn new() -> ExtractionContext {
        Self {
            current: CurrentReading::default(),
            hourly: TARGET_HOURS.map(|(label, hour)| HourlySlot::new(label, hour)),
            daily: Default::default(),
            stats: PassStats::default(),
            first_date: None,
            previous_date: None,
            day_index: 0,
        }
    }

    /// Zero for the first entry's date, incremented on every date change
    pub fn day_index(&self) -> usize {
        self.day_index
    }

    /// Folds one decoded entry into all accumulators.
    ///
    /// Returns true when this entry completed the last of the daily aggregates.
    ///
    /// # Arguments
    ///
    /// * 'entry' - the entry, which must be later than or equal to all earlier ones
    pub fn process_entry(&mut self, entry: &ForecastEntry) -> bool {
        self.stats.decoded += 1;

        if self.first_date.is_none() {
            let names = entry.parameters
                .iter()
                .map(|p| format!("{}[{}]", p.name, p.unit))
                .collect::<Vec<String>>()
                .join(" ");
            debug!("first entry {}: {}", entry.valid_time, names);
        }
        let first_date = self.first_date.get_or_insert_with(|| entry.date.clone());
        let is_first_date = *first_date == entry.date;

        if !self.current.valid {
            self.fill_current(entry);
        }

        // Today, or tomorrow as a fallback when today's hours have already passed
        if is_first_date || self.day_index == 1 {
            self.fill_hourly(entry);
        }

        if self.previous_date.as_ref().is_some_and(|d| *d != entry.date) {
            self.day_index += 1;
        }
        self.previous_date = Some(entry.date.clone());

        if self.day_index >= 1 && self.day_index <= TARGET_DAYS {
            if fold(&mut self.daily[self.day_index - 1], entry) {
                self.stats.days_collected += 1;
                debug!("day {} ({}) collected", self.day_index, entry.date);
            }
        }

        self.stats.days_collected >= TARGET_DAYS
    }

    fn fill_current(&mut self, entry: &ForecastEntry) {
        let code = entry.weather_code();
        if code == 0 {
            return;
        }

        self.current = CurrentReading {
            valid_time: entry.valid_time.clone(),
            temperature: entry.value(TEMPERATURE).unwrap_or(0.0),
            humidity: entry.value(HUMIDITY).unwrap_or(0.0),
            wind_speed: entry.value(WIND_SPEED).unwrap_or(0.0),
            wind_direction_degrees: entry.value(WIND_DIRECTION).unwrap_or(0.0),
            sea_level_pressure: entry.value(PRESSURE).unwrap_or(0.0),
            weather_code: code,
            valid: true,
        };
    }

    fn fill_hourly(&mut self, entry: &ForecastEntry) {
        for slot in self.hourly.iter_mut().filter(|s| !s.valid && s.target_hour == entry.hour) {
            slot.valid_time = entry.valid_time.clone();
            slot.temperature = entry.value(TEMPERATURE).unwrap_or(0.0);
            slot.weather_code = entry.weather_code();
            slot.wind_speed = entry.value(WIND_SPEED).unwrap_or(0.0);
            slot.wind_direction_degrees = entry.value(WIND_DIRECTION).unwrap_or(0.0);
            slot.rain_probability = entry.value(RAIN_PROBABILITY).unwrap_or(0.0);
            slot.valid = true;
        }
    }
}

impl Default for ExtractionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs extraction passes, one at a time
pub struct Extractor {
    limits: Limits,
    running: AtomicBool,
}

/// Clears the running flag when a pass ends, whichever way it ends
struct PassGuard<'a>(&'a AtomicBool);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Extractor {
    /// Returns an extractor bound by the given limits
    ///
    /// # Arguments
    ///
    /// * 'limits' - work bounds applied to every pass
    pub fn new(limits: Limits) -> Extractor {
        Self { limits, running: AtomicBool::new(false) }
    }

    /// True while a pass is in flight, callers should skip rather than wait
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Runs one extraction pass over the stream.
    ///
    /// The cursor may be positioned anywhere before the `timeSeries` array. Not finding
    /// the array is the only fatal outcome; every other stop (limits, deadline, broken
    /// entries beyond the error budget, end of data) returns whatever was collected.
    ///
    /// # Arguments
    ///
    /// * 'cursor' - stream to read from
    /// * 'on_chunk' - called every `chunk_size` entries, lets the caller service other work
    pub fn extract<R: Read>(
        &self,
        cursor: &mut StreamCursor<R>,
        mut on_chunk: impl FnMut(&PassStats),
    ) -> Result<ExtractionContext, ExtractError> {
        if self.running.swap(true, Ordering::AcqRel) {
            return Err(ExtractError::PassInProgress);
        }
        let _guard = PassGuard(&self.running);

        let started = Instant::now();
        let mut ctx = ExtractionContext::new();

        match self.scan_patiently(cursor, &mut ctx.stats, ARRAY_MARKER, None)? {
            Scan::First => {},
            _ => return Err(ExtractError::StreamFormat(format!("{} not found in stream", ARRAY_MARKER))),
        }
        info!("forecast array found after {} bytes", cursor.consumed());

        let mut resumed = false;
        let exit = loop {
            if ctx.stats.entries >= self.limits.max_entries {
                break ExitReason::EntryLimit;
            }
            if ctx.stats.malformed >= self.limits.max_decode_errors {
                break ExitReason::ErrorLimit;
            }
            if started.elapsed() >= self.limits.max_elapsed {
                break ExitReason::Deadline;
            }

            let decoded = if resumed {
                resumed = false;
                decode_resumed(cursor).map(Some)
            } else {
                decode_next(cursor)
            };

            if !matches!(decoded, Ok(None)) {
                ctx.stats.entries += 1;
                if self.limits.chunk_size > 0 && ctx.stats.entries % self.limits.chunk_size == 0 {
                    ctx.stats.elapsed_ms = started.elapsed().as_millis() as u64;
                    on_chunk(&ctx.stats);
                }
            }

            match decoded {
                Ok(Some(entry)) => {
                    if ctx.process_entry(&entry) {
                        break ExitReason::DaysComplete;
                    }
                },
                Ok(None) => break ExitReason::EndOfArray,
                Err(DecodeError::Unusable(e)) => {
                    ctx.stats.unusable += 1;
                    debug!("skipping entry {}: {}", ctx.stats.entries, e);
                },
                Err(DecodeError::Malformed(e)) => {
                    ctx.stats.malformed += 1;
                    warn!("malformed entry {} at byte {}: {}", ctx.stats.entries, cursor.consumed(), e);
                    match self.scan_patiently(cursor, &mut ctx.stats, ENTRY_KEY, None)? {
                        Scan::First => {
                            resumed = true;
                            continue;
                        },
                        _ => break ExitReason::EndOfStream,
                    }
                },
                Err(DecodeError::Exhausted) => break ExitReason::EndOfStream,
                Err(DecodeError::Io(e)) => {
                    warn!("stream read failed: {}", e);
                    break ExitReason::EndOfStream;
                },
            }

            match self.scan_patiently(cursor, &mut ctx.stats, ",", Some("]"))? {
                Scan::First => {},
                Scan::Second => break ExitReason::EndOfArray,
                _ => break ExitReason::EndOfStream,
            }
        };

        ctx.stats.exit = exit;
        ctx.stats.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            "pass done ({}): {} entries over {} dates, {} days, {} malformed, {} unusable in {} ms",
            exit, ctx.stats.entries, ctx.day_index() + 1, ctx.stats.days_collected,
            ctx.stats.malformed, ctx.stats.unusable, ctx.stats.elapsed_ms
        );

        Ok(ctx)
    }

    /// Scans for `first` (or `second` when given), waiting out a starved stream for a
    /// bounded number of attempts before reporting it as starved
    ///
    /// # Arguments
    ///
    /// * 'cursor' - stream to scan
    /// * 'stats' - pass statistics, counts the retries
    /// * 'first' - token reported as `Scan::First`
    /// * 'second' - optional token reported as `Scan::Second`
    fn scan_patiently<R: Read>(
        &self,
        cursor: &mut StreamCursor<R>,
        stats: &mut PassStats,
        first: &str,
        second: Option<&str>,
    ) -> Result<Scan, ExtractError> {
        let mut attempt = 0;
        loop {
            let scan = match second {
                Some(second) => cursor.scan_to_either(first, second)?,
                None => cursor.scan_to(first)?,
            };
            if scan != Scan::Starved || attempt >= self.limits.starve_retries {
                return Ok(scan);
            }
            attempt += 1;
            stats.starved_retries += 1;
            debug!("stream starved looking for {:?}, retry {}", first, attempt);
            thread::sleep(self.limits.starve_pause);
        }
    }
}
