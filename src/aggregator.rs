use crate::calendar::day_of_week;
use crate::models::forecast::{
    to_weather_code, DailyAggregate, ForecastEntry, RAIN_PROBABILITY, TEMPERATURE, WEATHER_CODE,
};

/// Folds one entry into the running aggregate of its day.
///
/// Temperature widens the min/max range, only the first non-zero weather code is kept
/// and the rain probability is a running peak. Date and weekday are set on the first
/// contribution.
///
/// Returns true if this fold made the day valid, which happens at most once per day:
/// either because a temperature has been seen, or because a weather code has been seen
/// without any temperature (both temperatures then default to 0).
///
/// # Arguments
///
/// * 'day' - the day aggregate to update
/// * 'entry' - the entry belonging to that day
pub fn fold(day: &mut DailyAggregate, entry: &ForecastEntry) -> bool {
    if day.samples == 0 {
        day.date = entry.date.clone();
        day.day_of_week = day_of_week(&entry.date).unwrap_or("");
    }
    day.samples += 1;

    for p in entry.parameters.iter() {
        let Some(value) = p.value() else { continue };

        match p.name.as_str() {
            TEMPERATURE => {
                day.temp_min = day.temp_min.min(value);
                day.temp_max = day.temp_max.max(value);
            },
            WEATHER_CODE => {
                if day.weather_code == 0 {
                    day.weather_code = to_weather_code(value);
                }
            },
            RAIN_PROBABILITY => {
                day.peak_rain_probability = day.peak_rain_probability.max(value);
            },
            _ => {},
        }
    }

    promote(day)
}

/// Marks a day valid once it holds usable data, returns true on that transition
///
/// # Arguments
///
/// * 'day' - the day aggregate to check
fn promote(day: &mut DailyAggregate) -> bool {
    if day.valid {
        return false;
    }

    if day.temp_min != f64::INFINITY {
        day.valid = true;
        true
    } else if day.weather_code != 0 {
        day.temp_min = 0.0;
        day.temp_max = 0.0;
        day.valid = true;
        true
    } else {
        false
    }
}
