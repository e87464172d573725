//! # Host Dispatch Loop
//!
//! Stands in for the watch platform: a single-threaded loop that delivers
//! [`HostEvent`]s to the engine, fires the redraw timer when its tick is due,
//! and paints a frame whenever the engine has been invalidated.
//!
//! Events reach the loop over an unbounded channel. In the binary they come
//! from the companion link on stdin, one JSON object per line:
//!
//! ```text
//! {"visibility":true}
//! {"ambient":false}
//! {"properties":{"burn_in_protection":false,"low_bit_ambient":true}}
//! {"insets":{"round":true}}
//! {"data_changed":[{"kind":"changed","path":"/weather","data":{"high_temperature":"75°","low_temperature":"50°","weather_condition":800}}]}
//! "time_tick"
//! "destroy"
//! ```

use crate::clock::WallClock;
use crate::engine::{Insets, Properties, WatchFaceEngine};
use crate::error::FaceError;
use crate::render::Frame;
use crate::sync::{ConnectionEvent, DataEvent, DataLayer};
use embedded_graphics::primitives::Rectangle;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Everything the platform can tell the face
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostEvent {
    Visibility(bool),
    Ambient(bool),
    Properties(Properties),
    Insets(Insets),
    TimeTick,
    TimezoneChanged,
    Connection(ConnectionEvent),
    DataChanged(Vec<DataEvent>),
    Destroy,
}

/// Parse one companion-link line
pub fn parse_link_line(line: &str) -> Result<HostEvent, FaceError> {
    Ok(serde_json::from_str(line.trim())?)
}

/// Route one event to the matching engine callback
pub fn dispatch<D: DataLayer, C: WallClock>(engine: &mut WatchFaceEngine<D, C>, event: HostEvent) {
    match event {
        HostEvent::Visibility(visible) => engine.on_visibility_changed(visible),
        HostEvent::Ambient(ambient) => engine.on_ambient_mode_changed(ambient),
        HostEvent::Properties(properties) => engine.on_properties_changed(properties),
        HostEvent::Insets(insets) => engine.on_apply_window_insets(insets),
        HostEvent::TimeTick => engine.on_time_tick(),
        HostEvent::TimezoneChanged => engine.on_timezone_changed(),
        HostEvent::Connection(event) => engine.on_connection_event(event),
        HostEvent::DataChanged(events) => engine.on_data_changed(&events),
        HostEvent::Destroy => engine.on_destroy(),
    }
}

/// Forward companion-link lines into the host loop until EOF.
///
/// Blank lines are skipped; malformed ones are logged and skipped. The end of
/// the link is a teardown: a [`HostEvent::Destroy`] follows the last line.
pub async fn read_link<R>(reader: R, events: UnboundedSender<HostEvent>) -> Result<(), FaceError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_link_line(&line) {
            Ok(event) => {
                if events.send(event).is_err() {
                    return Ok(());
                }
            }
            Err(e) => warn!("Skipping link line: {}", e),
        }
    }
    info!("Companion link closed");
    events.send(HostEvent::Destroy).ok();
    Ok(())
}

async fn sleep_or_forever(wait: Option<Duration>) {
    match wait {
        Some(wait) => tokio::time::sleep(wait).await,
        None => std::future::pending::<()>().await,
    }
}

/// Drive the engine until it is destroyed or the event channel closes.
///
/// The engine's [`LinkDataLayer`](crate::sync::LinkDataLayer) holds a sender
/// of its own, so with that layer the loop ends on a `destroy` event, which
/// [`read_link`] sends when the link closes.
///
/// `on_frame` receives each frame composed after an invalidation.
pub async fn run<D, C, F>(
    engine: &mut WatchFaceEngine<D, C>,
    events: &mut UnboundedReceiver<HostEvent>,
    bounds: Rectangle,
    mut on_frame: F,
) where
    D: DataLayer,
    C: WallClock,
    F: FnMut(&Frame),
{
    loop {
        if engine.take_invalidated() {
            let frame = engine.draw(bounds);
            on_frame(&frame);
        }
        if engine.is_destroyed() {
            break;
        }

        let wait = engine.timer().pending().map(|tick| {
            let now = engine.clock().now_millis();
            Duration::from_millis((tick.due_ms - now).max(0) as u64)
        });

        tokio::select! {
            biased;

            event = events.recv() => match event {
                Some(event) => dispatch(engine, event),
                None => {
                    info!("Host event channel closed");
                    engine.on_destroy();
                }
            },
            _ = sleep_or_forever(wait) => {
                engine.poll_timer();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::Config;
    use crate::sync::{DataEventKind, LinkDataLayer};
    use embedded_graphics::prelude::*;

    const BOUNDS: Rectangle = Rectangle::new(Point::new(0, 0), Size::new(240, 240));

    #[test]
    fn test_parse_link_lines() {
        assert_eq!(
            parse_link_line(r#"{"visibility":true}"#).unwrap(),
            HostEvent::Visibility(true)
        );
        assert_eq!(parse_link_line(r#""time_tick""#).unwrap(), HostEvent::TimeTick);
        assert_eq!(
            parse_link_line(r#"{"properties":{"low_bit_ambient":true}}"#).unwrap(),
            HostEvent::Properties(Properties {
                burn_in_protection: false,
                low_bit_ambient: true
            })
        );
        assert_eq!(
            parse_link_line(r#"{"connection":{"failed":"timeout"}}"#).unwrap(),
            HostEvent::Connection(ConnectionEvent::Failed("timeout".to_string()))
        );

        match parse_link_line(
            r#"{"data_changed":[{"kind":"changed","path":"/weather","data":{"weather_condition":800}}]}"#,
        )
        .unwrap()
        {
            HostEvent::DataChanged(events) => {
                assert_eq!(events.len(), 1);
                assert_eq!(events[0].kind, DataEventKind::Changed);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_link_line("{\"visibility\":"),
            Err(FaceError::Link(_))
        ));
        assert!(parse_link_line(r#"{"teleport":1}"#).is_err());
    }

    #[tokio::test]
    async fn test_read_link_skips_bad_lines() {
        let input: &[u8] = b"{\"visibility\":true}\n\nnot json\n\"destroy\"\n";
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        read_link(input, tx).await.unwrap();

        assert_eq!(rx.recv().await, Some(HostEvent::Visibility(true)));
        assert_eq!(rx.recv().await, Some(HostEvent::Destroy));
        assert_eq!(rx.recv().await, Some(HostEvent::Destroy));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_closed_link_tears_down_engine() {
        let input: &[u8] = b"{\"visibility\":true}\n";
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut engine = WatchFaceEngine::create(
            &Config::default(),
            LinkDataLayer::new(tx.clone()),
            ManualClock::new(0),
        );

        read_link(input, tx).await.unwrap();
        run(&mut engine, &mut rx, BOUNDS, |_| {}).await;

        assert!(engine.is_destroyed());
    }
}
