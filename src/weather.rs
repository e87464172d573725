//! # Weather Sync Listener
//!
//! The companion app pushes the day's forecast as a data item at `/weather`
//! with three fields:
//!
//! | key                 | type    |
//! |---------------------|---------|
//! | `high_temperature`  | string  |
//! | `low_temperature`   | string  |
//! | `weather_condition` | integer |
//!
//! Temperatures arrive already formatted (e.g. `"75°"`) and are shown as-is.
//! The condition code follows the OpenWeatherMap numbering and selects an
//! icon; code 0 or anything unknown shows the application icon instead.
//!
//! A missing field is not an error. It just leaves that part of the snapshot
//! empty, and the renderer skips the whole weather block.

use crate::icons::{IconBitmap, WeatherIcon};
use crate::sync::{DataEvent, DataEventKind, DataMap};
use log::debug;

/// Path of the forecast data item
pub const WEATHER_PATH: &str = "/weather";
pub const HIGH_TEMPERATURE: &str = "high_temperature";
pub const LOW_TEMPERATURE: &str = "low_temperature";
pub const WEATHER_CONDITION: &str = "weather_condition";

/// Latest forecast received from the companion
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeatherSnapshot {
    pub high: Option<String>,
    pub low: Option<String>,
    pub condition: i32,
    pub icon: Option<IconBitmap>,
}

impl WeatherSnapshot {
    /// Unpack a `/weather` payload, decoding the icon at `icon_size` pixels
    pub fn from_data_map(data: &DataMap, icon_size: u32) -> Self {
        let condition = data.get_int(WEATHER_CONDITION).unwrap_or(0);
        let icon = icon_for_condition(condition).unwrap_or(WeatherIcon::Launcher);

        Self {
            high: data.get_string(HIGH_TEMPERATURE).map(str::to_string),
            low: data.get_string(LOW_TEMPERATURE).map(str::to_string),
            condition,
            icon: Some(IconBitmap::decode(icon, icon_size)),
        }
    }

    /// Everything the weather block needs, or `None` if anything is missing
    pub fn drawable(&self) -> Option<(&str, &str, IconBitmap)> {
        Some((self.high.as_deref()?, self.low.as_deref()?, self.icon?))
    }
}

/// Icon for an OpenWeatherMap condition code
pub fn icon_for_condition(code: i32) -> Option<WeatherIcon> {
    let icon = match code {
        200..=232 => WeatherIcon::Storm,
        300..=321 => WeatherIcon::LightRain,
        500..=504 => WeatherIcon::Rain,
        511 => WeatherIcon::Snow,
        520..=531 => WeatherIcon::Rain,
        600..=622 => WeatherIcon::Snow,
        701..=761 => WeatherIcon::Fog,
        781 => WeatherIcon::Storm,
        800 => WeatherIcon::Clear,
        801 => WeatherIcon::LightClouds,
        802..=804 => WeatherIcon::Clouds,
        _ => return None,
    };
    Some(icon)
}

/// Fold a batch of data events into the current snapshot.
///
/// Only `Changed` events at [`WEATHER_PATH`] count; the last one in the batch
/// wins. Returns `true` when the snapshot was replaced and a redraw is due.
pub fn apply_events(
    current: &mut Option<WeatherSnapshot>,
    events: &[DataEvent],
    icon_size: u32,
) -> bool {
    let mut updated = false;
    for event in events {
        if event.kind != DataEventKind::Changed || event.path != WEATHER_PATH {
            continue;
        }
        debug!("Weather data item updated: {:?}", event.data);
        *current = Some(WeatherSnapshot::from_data_map(&event.data, icon_size));
        updated = true;
    }
    updated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(high: Option<&str>, low: Option<&str>, condition: Option<i64>) -> DataMap {
        let mut map = DataMap::new();
        if let Some(high) = high {
            map.put_string(HIGH_TEMPERATURE, high);
        }
        if let Some(low) = low {
            map.put_string(LOW_TEMPERATURE, low);
        }
        if let Some(condition) = condition {
            map.put_int(WEATHER_CONDITION, condition);
        }
        map
    }

    #[test]
    fn test_condition_table() {
        assert_eq!(icon_for_condition(211), Some(WeatherIcon::Storm));
        assert_eq!(icon_for_condition(310), Some(WeatherIcon::LightRain));
        assert_eq!(icon_for_condition(502), Some(WeatherIcon::Rain));
        assert_eq!(icon_for_condition(511), Some(WeatherIcon::Snow));
        assert_eq!(icon_for_condition(521), Some(WeatherIcon::Rain));
        assert_eq!(icon_for_condition(601), Some(WeatherIcon::Snow));
        assert_eq!(icon_for_condition(741), Some(WeatherIcon::Fog));
        // 761 sits in the fog range first
        assert_eq!(icon_for_condition(761), Some(WeatherIcon::Fog));
        assert_eq!(icon_for_condition(781), Some(WeatherIcon::Storm));
        assert_eq!(icon_for_condition(800), Some(WeatherIcon::Clear));
        assert_eq!(icon_for_condition(801), Some(WeatherIcon::LightClouds));
        assert_eq!(icon_for_condition(804), Some(WeatherIcon::Clouds));
    }

    #[test]
    fn test_unmapped_codes() {
        for code in [0, -1, 199, 233, 505, 700, 900] {
            assert_eq!(icon_for_condition(code), None, "code {}", code);
        }
    }

    #[test]
    fn test_snapshot_from_full_payload() {
        let snapshot = WeatherSnapshot::from_data_map(&payload(Some("75°"), Some("50°"), Some(800)), 24);
        assert_eq!(snapshot.high.as_deref(), Some("75°"));
        assert_eq!(snapshot.low.as_deref(), Some("50°"));
        assert_eq!(snapshot.condition, 800);
        assert_eq!(snapshot.icon, Some(IconBitmap::decode(WeatherIcon::Clear, 24)));
    }

    #[test]
    fn test_zero_or_unmapped_condition_uses_launcher_icon() {
        for condition in [Some(0), Some(42), None] {
            let snapshot =
                WeatherSnapshot::from_data_map(&payload(Some("75°"), Some("50°"), condition), 24);
            assert_eq!(snapshot.icon.unwrap().icon, WeatherIcon::Launcher);
        }
    }

    #[test]
    fn test_missing_temperature_is_not_drawable() {
        let snapshot = WeatherSnapshot::from_data_map(&payload(Some("75°"), None, Some(500)), 24);
        assert!(snapshot.low.is_none());
        assert!(snapshot.drawable().is_none());
    }

    #[test]
    fn test_apply_events_filters_path_and_kind() {
        let mut current = None;
        let events = vec![
            DataEvent::changed("/config", payload(Some("1"), Some("2"), Some(800))),
            DataEvent {
                kind: DataEventKind::Deleted,
                path: WEATHER_PATH.to_string(),
                data: DataMap::new(),
            },
        ];
        assert!(!apply_events(&mut current, &events, 24));
        assert!(current.is_none());

        let events = vec![
            DataEvent::changed(WEATHER_PATH, payload(Some("70°"), Some("40°"), Some(500))),
            DataEvent::changed(WEATHER_PATH, payload(Some("75°"), Some("50°"), Some(800))),
        ];
        assert!(apply_events(&mut current, &events, 24));
        assert_eq!(current.unwrap().high.as_deref(), Some("75°"));
    }

    #[test]
    fn test_new_payload_replaces_snapshot_wholesale() {
        let mut current = None;
        apply_events(
            &mut current,
            &[DataEvent::changed(WEATHER_PATH, payload(Some("75°"), Some("50°"), Some(800)))],
            24,
        );
        apply_events(
            &mut current,
            &[DataEvent::changed(WEATHER_PATH, payload(Some("60°"), None, None))],
            24,
        );
        let snapshot = current.unwrap();
        assert_eq!(snapshot.high.as_deref(), Some("60°"));
        assert!(snapshot.low.is_none());
        assert_eq!(snapshot.condition, 0);
    }
}
