use serde::Serialize;

/// SMHI parameter names used by the extraction
pub const TEMPERATURE: &str = "t";
pub const HUMIDITY: &str = "r";
pub const WIND_SPEED: &str = "ws";
pub const WIND_DIRECTION: &str = "wd";
pub const PRESSURE: &str = "msl";
pub const WEATHER_CODE: &str = "Wsymb2";
pub const RAIN_PROBABILITY: &str = "tstm";

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub unit: String,
    pub values: Vec<f64>,
}

impl Parameter {
    /// The only value ever consulted is the first one
    pub fn value(&self) -> Option<f64> {
        self.values.first().copied()
    }
}

/// One decoded forecast entry, transient until folded into the accumulators
#[derive(Debug, Clone)]
pub struct ForecastEntry {
    pub valid_time: String,
    /// `YYYY-MM-DD`, the first ten characters of the timestamp
    pub date: String,
    pub hour: u32,
    pub parameters: Vec<Parameter>,
}

impl ForecastEntry {
    /// Returns the first value of the first parameter with the given name
    ///
    /// # Arguments
    ///
    /// * 'name' - SMHI parameter name
    pub fn value(&self, name: &str) -> Option<f64> {
        self.parameters
            .iter()
            .filter(|p| p.name == name)
            .find_map(|p| p.value())
    }

    /// Weather code of the entry, 0 if it carries none
    pub fn weather_code(&self) -> u8 {
        self.value(WEATHER_CODE).map_or(0, to_weather_code)
    }
}

/// Converts a raw Wsymb2 value to a code where 0 means no code
///
/// # Arguments
///
/// * 'value' - the raw value
pub fn to_weather_code(value: f64) -> u8 {
    if value.is_finite() && value >= 1.0 {
        value.floor().min(u8::MAX as f64) as u8
    } else {
        0
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct CurrentReading {
    pub valid_time: String,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_direction_degrees: f64,
    pub sea_level_pressure: f64,
    pub weather_code: u8,
    pub valid: bool,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct HourlySlot {
    pub label: &'static str,
    pub target_hour: u32,
    pub valid_time: String,
    pub temperature: f64,
    pub weather_code: u8,
    pub wind_speed: f64,
    pub wind_direction_degrees: f64,
    pub rain_probability: f64,
    pub valid: bool,
}

impl HourlySlot {
    pub fn new(label: &'static str, target_hour: u32) -> HourlySlot {
        Self { label, target_hour, ..Default::default() }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DailyAggregate {
    pub date: String,
    pub day_of_week: &'static str,
    pub temp_min: f64,
    pub temp_max: f64,
    pub weather_code: u8,
    pub peak_rain_probability: f64,
    pub description: &'static str,
    pub samples: usize,
    pub valid: bool,
}

impl Default for DailyAggregate {
    fn default() -> Self {
        Self {
            date: String::new(),
            day_of_week: "",
            temp_min: f64::INFINITY,
            temp_max: f64::NEG_INFINITY,
            weather_code: 0,
            peak_rain_probability: 0.0,
            description: "",
            samples: 0,
            valid: false,
        }
    }
}
