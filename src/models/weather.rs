use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    database::{Database, Record},
    error::Error,
};

pub const MAX_RAINFALL_MM: f64 = 5.0;
pub const MAX_WIND_SPEED_MS: f64 = 10.0;
pub const MIN_TEMPERATURE_C: f64 = 5.0;
pub const MAX_TEMPERATURE_C: f64 = 35.0;

const CAUTION_WIND_SPEED_MS: f64 = 5.0;
const CAUTION_COLD_C: f64 = 10.0;
const CAUTION_HEAT_C: f64 = 30.0;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Sunny,
    Cloudy,
    Overcast,
    LightRain,
    ModerateRain,
    HeavyRain,
    Thunderstorm,
}

/// `(low, span)` pairs: a draw of `u` in `[0, 1)` maps to `low + u * span`.
struct ConditionRanges {
    temperature: (f64, f64),
    rainfall: (f64, f64),
    wind_speed: (f64, f64),
}

impl WeatherCondition {
    pub const ALL: [WeatherCondition; 7] = [
        WeatherCondition::Sunny,
        WeatherCondition::Cloudy,
        WeatherCondition::Overcast,
        WeatherCondition::LightRain,
        WeatherCondition::ModerateRain,
        WeatherCondition::HeavyRain,
        WeatherCondition::Thunderstorm,
    ];

    fn ranges(self) -> ConditionRanges {
        let (temperature, rainfall, wind_speed) = match self {
            WeatherCondition::Sunny => ((20.0, 10.0), (0.0, 0.0), (0.0, 5.0)),
            WeatherCondition::Cloudy => ((15.0, 10.0), (0.0, 0.0), (0.0, 8.0)),
            WeatherCondition::Overcast => ((10.0, 10.0), (0.0, 2.0), (0.0, 10.0)),
            WeatherCondition::LightRain => ((8.0, 8.0), (2.0, 3.0), (0.0, 12.0)),
            WeatherCondition::ModerateRain => ((5.0, 5.0), (5.0, 5.0), (0.0, 15.0)),
            WeatherCondition::HeavyRain => ((0.0, 5.0), (10.0, 10.0), (0.0, 20.0)),
            WeatherCondition::Thunderstorm => ((15.0, 10.0), (5.0, 15.0), (0.0, 25.0)),
        };
        ConditionRanges {
            temperature,
            rainfall,
            wind_speed,
        }
    }
    fn alert(self) -> Option<&'static str> {
        match self {
            WeatherCondition::Thunderstorm => {
                Some("Thunderstorm expected, take lightning precautions.")
            }
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReading {
    pub temperature: f64,
    pub rainfall: f64,
    pub wind_speed: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherInfo {
    #[serde(default)]
    pub id: Option<u64>,
    pub location: String,
    pub date: NaiveDate,
    pub weather_condition: WeatherCondition,
    pub temperature: f64,
    pub rainfall: f64,
    pub wind_speed: f64,
    pub weather_alert: Option<String>,
    pub suitable_for_work: bool,
    pub work_suggestion: String,
}

impl Record for WeatherInfo {
    fn id(&self) -> Option<u64> {
        self.id
    }
    fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }
}

/// Whether outdoor construction may go ahead.
pub fn is_suitable(reading: &WeatherReading) -> bool {
    reading.rainfall <= MAX_RAINFALL_MM
        && reading.wind_speed <= MAX_WIND_SPEED_MS
        && reading.temperature >= MIN_TEMPERATURE_C
        && reading.temperature <= MAX_TEMPERATURE_C
}

/// Cautions for the crew, triggered by softer thresholds than [`is_suitable`].
pub fn work_suggestion(reading: &WeatherReading) -> String {
    let mut cautions: Vec<&str> = Vec::new();

    if reading.rainfall > 0.0 {
        cautions.push("Rain expected, prepare rain gear and cover materials.");
    }
    if reading.wind_speed > CAUTION_WIND_SPEED_MS {
        cautions.push("Strong wind, take extra care with work at height.");
    }
    if reading.temperature < CAUTION_COLD_C {
        cautions.push("Low temperature, keep the crew warm.");
    } else if reading.temperature > CAUTION_HEAT_C {
        cautions.push("High temperature, take heat-stroke precautions.");
    }

    if cautions.is_empty() {
        "Weather is suitable for construction, proceed normally.".to_string()
    } else {
        cautions.join(" ")
    }
}

/// Impact summary stored on a shift: the hard thresholds that were violated.
pub fn weather_impact(reading: &WeatherReading) -> String {
    if is_suitable(reading) {
        return "Weather is suitable for construction.".to_string();
    }

    let mut reasons: Vec<&str> = Vec::new();
    if reading.rainfall > MAX_RAINFALL_MM {
        reasons.push("rainfall too heavy");
    }
    if reading.wind_speed > MAX_WIND_SPEED_MS {
        reasons.push("wind too strong");
    }
    if reading.temperature < MIN_TEMPERATURE_C {
        reasons.push("temperature too low");
    }
    if reading.temperature > MAX_TEMPERATURE_C {
        reasons.push("temperature too high");
    }
    format!("Weather is unsuitable for construction: {}.", reasons.join("; "))
}

fn one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Supplies uniform draws in `[0, 1)` for weather synthesis.
pub trait WeatherSource: Send + Sync {
    fn draw_unit(&self) -> f64;
}

/// Draws from the operating system's entropy source.
pub struct RandomWeather;

impl WeatherSource for RandomWeather {
    fn draw_unit(&self) -> f64 {
        let mut bytes = [0u8; 8];
        if let Err(error) = getrandom::getrandom(&mut bytes) {
            warn!(%error, "entropy source unavailable, using midpoint draw");
            return 0.5;
        }
        // 53 random bits fill an f64 mantissa exactly.
        let bits = u64::from_le_bytes(bytes) >> 11;
        bits as f64 / (1u64 << 53) as f64
    }
}

pub struct WeatherProvider {
    source: Box<dyn WeatherSource>,
    simulation_enabled: bool,
}

impl WeatherProvider {
    pub fn new(source: Box<dyn WeatherSource>, simulation_enabled: bool) -> Self {
        Self {
            source,
            simulation_enabled,
        }
    }
    pub fn simulated(simulation_enabled: bool) -> Self {
        Self::new(Box::new(RandomWeather), simulation_enabled)
    }

    pub fn simulate(&self, location: &str, date: NaiveDate) -> WeatherInfo {
        let index = (self.source.draw_unit() * WeatherCondition::ALL.len() as f64) as usize;
        let condition = WeatherCondition::ALL[index.min(WeatherCondition::ALL.len() - 1)];
        let ranges = condition.ranges();
        let draw = |(low, span): (f64, f64)| one_decimal(low + self.source.draw_unit() * span);

        let reading = WeatherReading {
            temperature: draw(ranges.temperature),
            rainfall: draw(ranges.rainfall),
            wind_speed: draw(ranges.wind_speed),
        };

        WeatherInfo {
            id: None,
            location: location.to_string(),
            date,
            weather_condition: condition,
            temperature: reading.temperature,
            rainfall: reading.rainfall,
            wind_speed: reading.wind_speed,
            weather_alert: condition.alert().map(str::to_string),
            suitable_for_work: is_suitable(&reading),
            work_suggestion: work_suggestion(&reading),
        }
    }

    /// Cached weather for `(location, date)`, synthesized and stored on a miss.
    pub async fn lookup(
        &self,
        db: &Database,
        location: &str,
        date: NaiveDate,
    ) -> Result<WeatherInfo, Error> {
        if let Some(info) = WeatherInfo::find_by_location_and_date(db, location, date).await {
            return Ok(info);
        }
        if !self.simulation_enabled {
            return Err(Error::NotFound("WEATHER_NOT_AVAILABLE"));
        }

        let info = db
            .weather
            .find_or_save(
                |info| info.location == location && info.date == date,
                || {
                    let info = self.simulate(location, date);
                    debug!(location, %date, condition = ?info.weather_condition, "weather synthesized");
                    info
                },
            )
            .await;
        Ok(info)
    }

    pub async fn refresh(&self, db: &Database, location: &str) -> Result<WeatherInfo, Error> {
        self.lookup(db, location, Local::now().date_naive()).await
    }
}

impl WeatherInfo {
    pub fn reading(&self) -> WeatherReading {
        WeatherReading {
            temperature: self.temperature,
            rainfall: self.rainfall,
            wind_speed: self.wind_speed,
        }
    }
    pub async fn find_by_location_and_date(
        db: &Database,
        location: &str,
        date: NaiveDate,
    ) -> Option<WeatherInfo> {
        db.weather
            .find_one(|info| info.location == location && info.date == date)
            .await
    }
}
