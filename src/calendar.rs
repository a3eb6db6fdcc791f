/// Zeller's congruence yields 0 for Saturday
const WEEKDAYS: [&str; 7] = [
    "Saturday", "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday",
];

/// Returns the english weekday name of a `YYYY-MM-DD` date using Zeller's congruence
/// for the Gregorian calendar.
///
/// Anything that isn't a plausible date gives None: every field must be plain digits,
/// the year at least 1 and the day of month is only range checked against 1-31.
///
/// # Arguments
///
/// * 'date' - date string, only the first ten characters are considered
pub fn day_of_week(date: &str) -> Option<&'static str> {
    let year = digits(date.get(0..4)?)?;
    let month = digits(date.get(5..7)?)?;
    let day = digits(date.get(8..10)?)?;
    if year < 1 || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }

    // January and February count as months 13 and 14 of the previous year
    let (m, y) = if month < 3 { (month + 12, year - 1) } else { (month, year) };
    let k = y % 100;
    let j = y / 100;

    let h = (day + 13 * (m + 1) / 5 + k + k / 4 + j / 4 + 5 * j).rem_euclid(7);

    Some(WEEKDAYS[h as usize])
}

fn digits(field: &str) -> Option<i64> {
    if !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
