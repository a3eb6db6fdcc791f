use std::fs::File;
use std::io::Read;
use std::time::Duration;
use thiserror::Error;
use ureq::Agent;

#[derive(Error, Debug)]
pub enum SMHIError {
    #[error("SMHIError::SMHI: {0}")]
    SMHI(String),
    #[error("SMHIError::File: {0}")]
    File(String),
}
impl From<ureq::Error> for SMHIError {
    fn from(e: ureq::Error) -> Self {
        SMHIError::SMHI(e.to_string())
    }
}

/// Struct for opening weather forecast streams produced by SMHI
pub struct SMHI {
    agent: Agent,
    lat: f64,
    long: f64,
}

impl SMHI {
    /// Returns a SMHI struct ready for opening forecast streams
    ///
    /// The given lat/long values will be truncated to 4 decimals since that is the max
    /// precision that SMHI allows in their forecast API
    ///
    /// # Arguments
    ///
    /// * 'lat' - latitude for the point to get forecasts for
    /// * 'long' - longitude for the point to get forecasts for
    pub fn new(lat: f64, long: f64) -> SMHI {
        let config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .build();

        let agent = config.into();

        Self { agent, lat, long }
    }

    /// Returns the point forecast url for the configured position
    pub fn url(&self) -> String {
        let smhi_domain = "https://opendata-download-metfcst.smhi.se";
        let base_url = "/api/category/pmp3g/version/2/geotype/point";
        format!("{}{}/lon/{:0.4}/lat/{:0.4}/data.json", smhi_domain, base_url, self.long, self.lat)
    }

    /// Requests the point forecast and returns the response body as an unread stream.
    ///
    /// Nothing of the document is read here, a failed request is reported as is and
    /// is not retried.
    pub fn open_forecast(&self) -> Result<Box<dyn Read>, SMHIError> {
        let response = self.agent
            .get(self.url())
            .call()?;

        Ok(Box::new(response.into_body().into_reader()))
    }
}

/// Opens a previously saved forecast document as a stream
///
/// # Arguments
///
/// * 'path' - path to the saved SMHI json document
pub fn open_forecast_file(path: &str) -> Result<Box<dyn Read>, SMHIError> {
    let file = File::open(path)
        .map_err(|e| SMHIError::File(format!("{}: {}", path, e)))?;

    Ok(Box::new(file))
}
