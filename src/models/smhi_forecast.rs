use serde::Deserialize;

/// One parameter of a `timeSeries` entry as delivered by SMHI
#[derive(Deserialize, Debug)]
pub struct RawParameter {
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub values: Vec<f64>,
}

/// One `timeSeries` entry as delivered by SMHI.
///
/// The timestamp is optional so that an entry without one can be told apart from an
/// object that doesn't parse. The parameter list is required, any other object (such as
/// a lone parameter) is not an entry.
#[derive(Deserialize, Debug)]
pub struct RawEntry {
    #[serde(rename = "validTime", default)]
    pub valid_time: Option<String>,
    pub parameters: Vec<RawParameter>,
}
