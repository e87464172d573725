//! # Watch Face Engine
//!
//! The engine is the one stateful piece of the face. The host drives it with
//! lifecycle callbacks (create, visibility, ambient mode, device properties,
//! insets, destroy), the data layer feeds it weather payloads, and the redraw
//! timer ticks it once a second. Every callback is a plain `&mut self`
//! method: all of them run on the host's single dispatch thread.
//!
//! The engine never draws on its own. It calls [`WatchFaceEngine::invalidate`]
//! and the host asks for a [`Frame`] when it is ready to paint.
//!
//! ## Registration invariants
//!
//! - The data listener is registered at most once per connection and is
//!   always removed before disconnecting.
//! - The time-zone receiver is registered at most once and only while visible.
//! - The timer runs iff the face is visible and not in ambient mode.

use crate::clock::{Calendar, WallClock};
use crate::config::{Config, TextConfig};
use crate::render::{compose, Frame, Layout, RenderState};
use crate::style::FaceStyles;
use crate::sync::{ConnectionEvent, DataEvent, DataLayer};
use crate::timer::{TimerDriver, TimerState, TimerTick};
use crate::weather::{self, WeatherSnapshot};
use embedded_graphics::primitives::Rectangle;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Device capabilities reported by the host
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Properties {
    pub burn_in_protection: bool,
    pub low_bit_ambient: bool,
}

/// Window insets; only the screen shape matters to the face
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Insets {
    pub round: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Connection to the data layer plus its listener registration
#[derive(Debug)]
pub struct ConnectionHandle<D> {
    layer: D,
    state: ConnectionState,
    listener_registered: bool,
}

impl<D: DataLayer> ConnectionHandle<D> {
    fn new(layer: D) -> Self {
        Self {
            layer,
            state: ConnectionState::Disconnected,
            listener_registered: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn listener_registered(&self) -> bool {
        self.listener_registered
    }

    pub fn layer(&self) -> &D {
        &self.layer
    }

    fn open(&mut self) {
        if self.state == ConnectionState::Disconnected {
            self.state = ConnectionState::Connecting;
            self.layer.connect();
        }
    }

    fn on_connected(&mut self) {
        if self.state == ConnectionState::Disconnected {
            // Connection result for a link that was closed meanwhile
            debug!("Ignoring connection result after disconnect");
            return;
        }
        self.state = ConnectionState::Connected;
        if !self.listener_registered {
            self.listener_registered = true;
            self.layer.add_listener();
        }
    }

    fn on_failed(&mut self) {
        if self.listener_registered {
            self.listener_registered = false;
            self.layer.remove_listener();
        }
        if self.state == ConnectionState::Connected {
            self.layer.disconnect();
        }
        self.state = ConnectionState::Disconnected;
    }

    fn close(&mut self) {
        if self.listener_registered {
            self.listener_registered = false;
            self.layer.remove_listener();
        }
        if self.state != ConnectionState::Disconnected {
            self.state = ConnectionState::Disconnected;
            self.layer.disconnect();
        }
    }
}

/// The watch face: render state, weather, timer and sync connection
pub struct WatchFaceEngine<D, C> {
    render: RenderState,
    weather: Option<WeatherSnapshot>,
    connection: ConnectionHandle<D>,
    timer: TimerDriver,
    clock: C,
    text_sizes: TextConfig,
    icon_size: u32,
    visible: bool,
    timezone_receiver_registered: bool,
    invalidated: bool,
    destroyed: bool,
}

impl<D: DataLayer, C: WallClock> WatchFaceEngine<D, C> {
    /// Build the face and start connecting to the data layer
    pub fn create(config: &Config, layer: D, clock: C) -> Self {
        let mut styles = FaceStyles::from_palette(&config.palette);
        styles.apply_sizes(config.text.for_shape(config.display.round));

        let render = RenderState {
            ambient: false,
            low_bit_ambient: false,
            burn_in_protection: false,
            calendar: Calendar::new(clock.zone()),
            layout: Layout::from(&config.layout),
            styles,
        };

        let mut engine = Self {
            render,
            weather: None,
            connection: ConnectionHandle::new(layer),
            timer: TimerDriver::new(config.timer.interactive_update_rate_ms),
            clock,
            text_sizes: config.text.clone(),
            icon_size: config.layout.icon_size,
            visible: false,
            timezone_receiver_registered: false,
            invalidated: false,
            destroyed: false,
        };
        info!("Watch face created");
        engine.connection.open();
        engine
    }

    // -- Host queries --

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_in_ambient_mode(&self) -> bool {
        self.render.ambient
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn render_state(&self) -> &RenderState {
        &self.render
    }

    pub fn weather(&self) -> Option<&WeatherSnapshot> {
        self.weather.as_ref()
    }

    pub fn connection(&self) -> &ConnectionHandle<D> {
        &self.connection
    }

    pub fn timer(&self) -> &TimerDriver {
        &self.timer
    }

    pub fn timer_state(&self) -> TimerState {
        self.timer.state()
    }

    pub fn timezone_receiver_registered(&self) -> bool {
        self.timezone_receiver_registered
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Request a redraw
    pub fn invalidate(&mut self) {
        self.invalidated = true;
    }

    /// Whether a redraw was requested since the last call
    pub fn take_invalidated(&mut self) -> bool {
        std::mem::take(&mut self.invalidated)
    }

    // -- Lifecycle --

    pub fn on_visibility_changed(&mut self, visible: bool) {
        if self.destroyed {
            return;
        }
        self.visible = visible;

        if visible {
            self.connection.open();
            self.register_timezone_receiver();
            // The zone may have changed while hidden
            self.render.calendar.set_time_zone(self.clock.zone());
        } else {
            self.connection.close();
            self.unregister_timezone_receiver();
        }

        self.update_timer();
    }

    pub fn on_ambient_mode_changed(&mut self, ambient: bool) {
        if self.destroyed {
            return;
        }
        if self.render.ambient != ambient {
            self.render.ambient = ambient;
            if self.render.low_bit_ambient {
                self.render.styles.set_anti_alias(!ambient);
            }
            self.invalidate();
        }

        self.update_timer();
    }

    pub fn on_properties_changed(&mut self, properties: Properties) {
        self.render.burn_in_protection = properties.burn_in_protection;
        self.render
            .styles
            .set_burn_in_protection(properties.burn_in_protection);
        self.render.low_bit_ambient = properties.low_bit_ambient;

        debug!(
            "onPropertiesChanged: burn-in protection = {}, low-bit ambient = {}",
            properties.burn_in_protection, properties.low_bit_ambient
        );
    }

    pub fn on_apply_window_insets(&mut self, insets: Insets) {
        let sizes = self.text_sizes.for_shape(insets.round);
        self.render.styles.apply_sizes(sizes);
        let shape = if insets.round { "round" } else { "square" };
        debug!("Applied {} text sizes: {:?}", shape, sizes);
    }

    /// Once-a-minute tick the host sends in ambient mode
    pub fn on_time_tick(&mut self) {
        self.invalidate();
    }

    pub fn on_timezone_changed(&mut self) {
        if !self.timezone_receiver_registered {
            return;
        }
        self.render.calendar.set_time_zone(self.clock.zone());
        self.invalidate();
    }

    pub fn on_destroy(&mut self) {
        self.destroyed = true;
        self.update_timer();
        self.connection.close();
        self.unregister_timezone_receiver();
        info!("Watch face destroyed");
    }

    // -- Data layer --

    pub fn on_connection_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Connected => {
                if self.destroyed {
                    return;
                }
                self.connection.on_connected();
            }
            ConnectionEvent::Suspended(cause) => {
                debug!("onConnectionSuspended: {}", cause);
            }
            ConnectionEvent::Failed(reason) => {
                warn!("onConnectionFailed: {}", reason);
                self.connection.on_failed();
            }
        }
    }

    pub fn on_data_changed(&mut self, events: &[DataEvent]) {
        if !self.connection.listener_registered() {
            debug!("Dropping {} data events: no listener registered", events.len());
            return;
        }
        if weather::apply_events(&mut self.weather, events, self.icon_size) {
            self.invalidate();
        }
    }

    // -- Timer --

    fn should_timer_be_running(&self) -> bool {
        self.visible && !self.render.ambient && !self.destroyed
    }

    fn update_timer(&mut self) {
        let run = self.should_timer_be_running();
        self.timer.update(run, self.clock.now_millis());
    }

    /// Hand the due tick to the engine, if there is one
    pub fn poll_timer(&mut self) -> bool {
        match self.timer.take_due(self.clock.now_millis()) {
            Some(tick) => {
                self.on_timer_tick(tick);
                true
            }
            None => false,
        }
    }

    /// Redraw and schedule the next aligned tick; stale ticks are ignored
    pub fn on_timer_tick(&mut self, tick: TimerTick) {
        if !self.timer.accepts(tick) {
            debug!("Ignoring stale timer tick (epoch {})", tick.epoch);
            return;
        }
        self.invalidate();
        if self.should_timer_be_running() {
            self.timer.schedule_next(self.clock.now_millis());
        }
    }

    // -- Drawing --

    /// Sample the clock and lay out a frame for `bounds`
    pub fn draw(&mut self, bounds: Rectangle) -> Frame {
        self.render
            .calendar
            .set_time_in_millis(self.clock.now_millis());
        compose(&self.render, self.weather.as_ref(), bounds)
    }

    fn register_timezone_receiver(&mut self) {
        if self.timezone_receiver_registered {
            return;
        }
        self.timezone_receiver_registered = true;
        debug!("Time-zone receiver registered");
    }

    fn unregister_timezone_receiver(&mut self) {
        if !self.timezone_receiver_registered {
            return;
        }
        self.timezone_receiver_registered = false;
        debug!("Time-zone receiver unregistered");
    }
}
