/// Wsymb2 descriptions, index 0 is code 1
/// (see https://opendata.smhi.se/metfcst/pmp/parameters#cloud-cover-parameters)
const WSYMB2_LONG: [&str; 27] = [
    "Clear sky",
    "Nearly clear sky",
    "Variable cloudiness",
    "Halfclear sky",
    "Cloudy sky",
    "Overcast",
    "Fog",
    "Light rain showers",
    "Moderate rain showers",
    "Heavy rain showers",
    "Thunderstorm",
    "Light sleet showers",
    "Moderate sleet showers",
    "Heavy sleet showers",
    "Light snow showers",
    "Moderate snow showers",
    "Heavy snow showers",
    "Light rain",
    "Moderate rain",
    "Heavy rain",
    "Thunder",
    "Light sleet",
    "Moderate sleet",
    "Heavy sleet",
    "Light snowfall",
    "Moderate snowfall",
    "Heavy snowfall",
];

/// Compact variants for narrow displays, same order as `WSYMB2_LONG`
const WSYMB2_SHORT: [&str; 27] = [
    "Clear",
    "Nearly clear",
    "Variable",
    "Half clear",
    "Cloudy",
    "Overcast",
    "Fog",
    "Light showers",
    "Showers",
    "Heavy showers",
    "Thunderstorm",
    "Lt sleet showers",
    "Sleet showers",
    "Hvy sleet showers",
    "Lt snow showers",
    "Snow showers",
    "Hvy snow showers",
    "Light rain",
    "Rain",
    "Heavy rain",
    "Thunder",
    "Light sleet",
    "Sleet",
    "Heavy sleet",
    "Light snow",
    "Snow",
    "Heavy snow",
];

const UNKNOWN: &str = "Unknown";

const COMPASS_16: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE",
    "S", "SSW", "SW", "WSW", "W", "WNW", "NW", "NNW",
];

const COMPASS_8: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Resolution of the compass rose used when naming a wind direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compass {
    /// 22.5 degree sectors
    Points16,
    /// 45 degree sectors
    Points8,
}

/// Translates a Wsymb2 weather code (1-27) to its full description
///
/// # Arguments
///
/// * 'code' - the weather code, 0 or anything above 27 gives "Unknown"
pub fn weather_description(code: u8) -> &'static str {
    lookup(&WSYMB2_LONG, code)
}

/// Translates a Wsymb2 weather code (1-27) to a short description
///
/// # Arguments
///
/// * 'code' - the weather code, 0 or anything above 27 gives "Unknown"
pub fn weather_short(code: u8) -> &'static str {
    lookup(&WSYMB2_SHORT, code)
}

fn lookup(table: &[&'static str; 27], code: u8) -> &'static str {
    match code {
        1..=27 => table[code as usize - 1],
        _ => UNKNOWN,
    }
}

/// Translates a wind direction in degrees to a compass point
///
/// # Arguments
///
/// * 'degrees' - direction the wind is coming from
/// * 'compass' - which compass rose to use
pub fn wind_direction(degrees: f64, compass: Compass) -> &'static str {
    if !degrees.is_finite() {
        return "N/A";
    }
    let degrees = degrees.rem_euclid(360.0);

    match compass {
        Compass::Points16 => COMPASS_16[((degrees + 11.25) / 22.5) as usize % 16],
        Compass::Points8 => COMPASS_8[((degrees.round() as usize) + 23) / 45 % 8],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_descriptions() {
        assert_eq!(weather_description(1), "Clear sky");
        assert_eq!(weather_short(1), "Clear");
        assert_eq!(weather_description(27), "Heavy snowfall");
        assert_eq!(weather_short(27), "Heavy snow");
        assert_eq!(weather_description(11), "Thunderstorm");
    }

    #[test]
    fn test_unknown_weather_codes() {
        for code in [0u8, 28, 255] {
            assert_eq!(weather_description(code), "Unknown");
            assert_eq!(weather_short(code), "Unknown");
        }
    }

    #[test]
    fn test_wind_direction_points() {
        assert_eq!(wind_direction(0.0, Compass::Points8), "N");
        assert_eq!(wind_direction(0.0, Compass::Points16), "N");
        assert_eq!(wind_direction(359.0, Compass::Points8), "N");
        assert_eq!(wind_direction(359.0, Compass::Points16), "N");
        assert_eq!(wind_direction(100.0, Compass::Points8), "E");
        assert_eq!(wind_direction(100.0, Compass::Points16), "E");
        assert_eq!(wind_direction(225.0, Compass::Points16), "SW");
        assert_eq!(wind_direction(202.0, Compass::Points16), "SSW");
        assert_eq!(wind_direction(290.0, Compass::Points8), "W");
    }

    #[test]
    fn test_wind_direction_out_of_range() {
        assert_eq!(wind_direction(360.0, Compass::Points16), "N");
        assert_eq!(wind_direction(-90.0, Compass::Points8), "W");
        assert_eq!(wind_direction(f64::NAN, Compass::Points8), "N/A");
    }
}
