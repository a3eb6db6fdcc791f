pub mod smhi_forecast;
pub mod forecast;
