//! # Sunshine Watch Face Core Library
//!
//! A digital watch face that shows the time, the date and today's forecast
//! pushed from a paired phone. The library holds the whole face; the binary
//! only wires it to a clock, a companion link and a frame sink.
//!
//! ## Design Philosophy
//!
//! ### Host-driven
//! The face never decides when to do anything on its own. The host delivers
//! lifecycle events (visibility, ambient mode, device properties, insets,
//! destroy) and the face reacts by updating its state and requesting a
//! redraw. All callbacks run on one dispatch thread, so there is no locking.
//!
//! ### Pure rendering
//! Drawing is a pure function from render state, weather snapshot and
//! viewport to a [`render::Frame`] of draw commands. The frame is rasterised
//! with `embedded-graphics`, so the same face can paint onto a panel driver,
//! a simulator, or the in-memory [`preview::PreviewCanvas`].
//!
//! ### Degrade, don't fail
//! A dropped companion connection or a half-filled weather payload never
//! surfaces as an error. The affected element is simply left out.
//!
//! ## Data Flow
//! 1. **Companion** publishes `/weather` → [`sync::DataEvent`]
//! 2. **Listener** unpacks it → [`weather::WeatherSnapshot`] → invalidate
//! 3. **Timer** ticks on whole seconds while visible and interactive → invalidate
//! 4. **Host** sees the invalidation → [`engine::WatchFaceEngine::draw`] → frame → display
//!
//! ## Example
//! ```
//! use embedded_graphics::{prelude::*, primitives::Rectangle};
//! use tokio::sync::mpsc::unbounded_channel;
//! use watchface_lib::{
//!     clock::ManualClock, config::Config, engine::WatchFaceEngine, sync::LinkDataLayer,
//! };
//!
//! let (tx, _rx) = unbounded_channel();
//! let config = Config::default();
//! let mut engine = WatchFaceEngine::create(&config, LinkDataLayer::new(tx), ManualClock::new(0));
//!
//! engine.on_visibility_changed(true);
//! let frame = engine.draw(Rectangle::new(Point::zero(), Size::new(240, 240)));
//! assert_eq!(frame.texts()[..3], ["00", ":", "00"]);
//! ```

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod icons;
pub mod preview;
pub mod render;
pub mod style;
pub mod sync;
pub mod timer;
pub mod weather;

pub use engine::WatchFaceEngine;
pub use error::FaceError;
pub use weather::WeatherSnapshot;

#[cfg(test)]
mod tests;
