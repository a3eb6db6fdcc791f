use std::fmt;
use serde::Serialize;
use crate::extraction::{ExtractionContext, PassStats};
use crate::models::forecast::{CurrentReading, DailyAggregate, HourlySlot};
use crate::translate::{weather_description, weather_short, wind_direction, Compass};

#[derive(Serialize, Debug, Clone)]
pub struct CurrentView {
    #[serde(flatten)]
    pub reading: CurrentReading,
    pub description: &'static str,
    pub wind_direction: &'static str,
}

#[derive(Serialize, Debug, Clone)]
pub struct HourlyView {
    #[serde(flatten)]
    pub slot: HourlySlot,
    pub description: &'static str,
    pub wind_direction: &'static str,
}

/// The three result records of a pass, ready for presentation.
///
/// Records that weren't reached during the pass are kept with `valid == false`, a
/// presenter should show them as missing data.
#[derive(Serialize, Debug, Clone)]
pub struct ForecastReport {
    pub current: CurrentView,
    pub hourly: Vec<HourlyView>,
    pub daily: Vec<DailyAggregate>,
    pub stats: PassStats,
}

/// Turns the accumulators of a finished pass into a report
///
/// # Arguments
///
/// * 'ctx' - the context returned by the pass, consumed
pub fn assemble(ctx: ExtractionContext) -> ForecastReport {
    let current = CurrentView {
        description: weather_description(ctx.current.weather_code),
        wind_direction: wind_direction(ctx.current.wind_direction_degrees, Compass::Points16),
        reading: ctx.current,
    };

    let hourly = ctx.hourly
        .into_iter()
        .map(|slot| HourlyView {
            description: weather_short(slot.weather_code),
            wind_direction: wind_direction(slot.wind_direction_degrees, Compass::Points8),
            slot,
        })
        .collect();

    let daily = ctx.daily
        .into_iter()
        .map(|mut day| {
            day.description = weather_description(day.weather_code);
            day
        })
        .collect();

    ForecastReport { current, hourly, daily, stats: ctx.stats }
}

/// Implementation of the Display Trait for pretty print
impl fmt::Display for ForecastReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let c = &self.current;
        if c.reading.valid {
            write!(f, "Now     {}: {:>5.1}°C {}\n", c.reading.valid_time, c.reading.temperature, c.description)?;
            write!(f, "        Humidity {:.0}%, Wind {:.1} m/s {}, Pressure {:.0} hPa\n",
                   c.reading.humidity, c.reading.wind_speed, c.wind_direction, c.reading.sea_level_pressure)?;
        } else {
            write!(f, "Now     : No data\n")?;
        }

        for h in &self.hourly {
            if h.slot.valid {
                write!(f, "{:<7} ({:02}:00): {:>5.1}°C {:<17} Wind {:>4.1} m/s {:<2} Rain {:>3.0}%\n",
                       h.slot.label, h.slot.target_hour, h.slot.temperature, h.description,
                       h.slot.wind_speed, h.wind_direction, h.slot.rain_probability)?;
            } else {
                write!(f, "{:<7}: No data\n", h.slot.label)?;
            }
        }

        for (i, d) in self.daily.iter().enumerate() {
            if d.valid {
                write!(f, "Day {} {:<9} {}: {:>5.1}/{:<5.1}°C Rain {:>3.0}% - {}\n",
                       i + 1, d.day_of_week, d.date, d.temp_max, d.temp_min,
                       d.peak_rain_probability, d.description)?;
            } else {
                write!(f, "Day {}: No data\n", i + 1)?;
            }
        }

        write!(f, "Pass: {} entries, {} ms, {}", self.stats.entries, self.stats.elapsed_ms, self.stats.exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::forecast::{ForecastEntry, Parameter};

    fn entry(time: &str, params: &[(&str, f64)]) -> ForecastEntry {
        ForecastEntry {
            valid_time: time.to_string(),
            date: time[0..10].to_string(),
            hour: time[11..13].parse().unwrap(),
            parameters: params
                .iter()
                .map(|(n, v)| Parameter { name: n.to_string(), unit: String::new(), values: vec![*v] })
                .collect(),
        }
    }

    #[test]
    fn assembles_descriptions_and_directions() {
        let mut ctx = ExtractionContext::new();
        ctx.process_entry(&entry("2025-10-23T08:00:00Z", &[("t", 4.0), ("wd", 100.0), ("Wsymb2", 1.0)]));
        ctx.process_entry(&entry("2025-10-24T00:00:00Z", &[("t", 2.0), ("Wsymb2", 27.0)]));

        let report = assemble(ctx);
        assert_eq!(report.current.description, "Clear sky");
        assert_eq!(report.current.wind_direction, "E");
        assert_eq!(report.hourly.len(), 3);
        assert_eq!(report.hourly[0].description, "Clear");
        assert_eq!(report.hourly[0].wind_direction, "E");
        assert_eq!(report.hourly[1].description, "Unknown");
        assert_eq!(report.daily.len(), 6);
        assert_eq!(report.daily[0].description, "Heavy snowfall");
        assert_eq!(report.daily[1].description, "Unknown");
        assert!(!report.daily[1].valid);
    }

    #[test]
    fn empty_report_renders() {
        let text = assemble(ExtractionContext::new()).to_string();
        assert!(text.starts_with("Now     : No data\n"));
        assert!(text.contains("Morning: No data"));
        assert!(text.contains("Day 6: No data"));
    }

    #[test]
    fn partial_report_renders() {
        let mut ctx = ExtractionContext::new();
        ctx.process_entry(&entry("2025-10-23T13:00:00Z", &[("t", 11.0), ("ws", 2.0), ("wd", 270.0), ("Wsymb2", 6.0), ("tstm", 15.0)]));
        ctx.process_entry(&entry("2025-10-24T00:00:00Z", &[("t", 2.0), ("Wsymb2", 3.0)]));
        let text = assemble(ctx).to_string();

        assert!(text.contains("Overcast"));
        assert!(text.contains("Noon    (13:00):  11.0°C Overcast"));
        assert!(text.contains("Day 1 Friday    2025-10-24:   2.0/2.0  °C Rain   0% - Variable cloudiness"));
        assert!(text.contains("Day 2: No data"));
    }

    #[test]
    fn report_serializes_to_json() {
        let mut ctx = ExtractionContext::new();
        ctx.process_entry(&entry("2025-10-23T13:00:00Z", &[("t", 11.0), ("Wsymb2", 6.0)]));
        let json = serde_json::to_value(assemble(ctx)).unwrap();

        assert_eq!(json["current"]["temperature"], 11.0);
        assert_eq!(json["current"]["description"], "Overcast");
        assert_eq!(json["hourly"][1]["label"], "Noon");
        assert_eq!(json["daily"][0]["valid"], false);
        assert_eq!(json["stats"]["exit"], "NotStarted");
    }
}
