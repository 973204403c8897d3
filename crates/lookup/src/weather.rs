use serde::{Deserialize, Serialize};

/// Current conditions at a point, as shown by the weather widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    /// Degrees Celsius (the backend proxies with metric units).
    pub temperature: Option<f64>,
    pub description: Option<String>,
    pub icon_id: Option<String>,
    /// Percent.
    pub humidity: Option<f64>,
    /// Meters per second.
    pub wind_speed: Option<f64>,
    /// Millimeters over the last hour.
    pub rainfall_last_hour: f64,
}

// Wire shape of the weather proxy, which forwards the OpenWeather
// current-conditions payload untouched. Every level may be missing.
#[derive(Debug, Default, Deserialize)]
struct WeatherPayload {
    #[serde(default)]
    main: Option<MainBlock>,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
    #[serde(default)]
    wind: Option<WindBlock>,
    #[serde(default)]
    rain: Option<RainBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct MainBlock {
    temp: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ConditionBlock {
    description: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WindBlock {
    speed: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct RainBlock {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

impl WeatherSnapshot {
    pub fn from_payload(payload: serde_json::Value) -> Result<Self, serde_json::Error> {
        let raw: WeatherPayload = serde_json::from_value(payload)?;
        let condition = raw.weather.into_iter().next().unwrap_or_default();
        let main = raw.main.unwrap_or_default();
        Ok(Self {
            temperature: main.temp,
            description: condition.description,
            icon_id: condition.icon,
            humidity: main.humidity,
            wind_speed: raw.wind.and_then(|w| w.speed),
            rainfall_last_hour: raw.rain.and_then(|r| r.one_hour).unwrap_or(0.0),
        })
    }

    pub fn icon_url(&self) -> Option<String> {
        self.icon_id
            .as_deref()
            .map(|id| format!("https://openweathermap.org/img/wn/{id}@2x.png"))
    }
}
