//! Service health supervisor.
//!
//! Tracks one [`ServiceState`] per monitored service and owns the policy
//! for (re)establishing each link. The supervisor never lets a failure
//! escape: every port error becomes a state transition and is remembered
//! as the service's last error for the Status screen.
//!
//! ## Poll policies
//!
//! | Service | Policy |
//! |---------|--------|
//! | WiFi    | associated → Connected; else Connecting, associate, Connected/Failed |
//! | Sensor  | Connecting, acquire if needed, test read; error → Failed + release |
//! | Broker  | WiFi not Connected → NoTransport; else Connecting, connect if needed, subscribe both topics; error → Failed + release |
//!
//! The gate [`HealthSupervisor::all_ready`] is true only when all three
//! services are Connected. A poll whose outcome *enters* Failed is the
//! trigger for forced navigation to the Status screen.

use log::{info, warn};

use crate::app::ports::{BrokerPort, EnvSensorPort, LinkPort};
use crate::config::StationConfig;
use crate::error::{BrokerError, DeviceError, Error, TransportError};
use crate::ingest::SUBSCRIPTIONS;

// ---------------------------------------------------------------------------
// Identity and state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Service {
    Wifi = 0,
    Sensor = 1,
    Broker = 2,
}

impl Service {
    pub const COUNT: usize = 3;

    /// Startup sweep order.
    pub const ALL: [Service; Service::COUNT] = [Service::Wifi, Service::Sensor, Service::Broker];

    pub fn label(self) -> &'static str {
        match self {
            Self::Wifi => "WiFi",
            Self::Sensor => "ENV",
            Self::Broker => "MQTT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed,
    /// Broker only: WiFi is not Connected, so no attempt was made.
    NoTransport,
}

impl ServiceState {
    /// Short label for the Status screen.
    pub fn label(self) -> &'static str {
        match self {
            Self::Disconnected => "Disc",
            Self::Connecting => "Conn",
            Self::Connected => "OK",
            Self::Failed => "Fail",
            Self::NoTransport => "NoWiFi",
        }
    }
}

/// Result of one poll or fault report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    pub service: Service,
    pub previous: ServiceState,
    pub state: ServiceState,
    pub changed: bool,
}

impl PollOutcome {
    /// True when this outcome moved the service into Failed.
    pub fn entered_failed(&self) -> bool {
        self.changed && self.state == ServiceState::Failed
    }
}

// ---------------------------------------------------------------------------
// Supervisor
// ---------------------------------------------------------------------------

pub struct HealthSupervisor {
    ssid: String,
    password: String,
    states: [ServiceState; Service::COUNT],
    last_errors: [Option<Error>; Service::COUNT],
}

impl HealthSupervisor {
    pub fn new(config: &StationConfig) -> Self {
        Self {
            ssid: config.wifi_ssid.clone(),
            password: config.wifi_password.clone(),
            states: [ServiceState::Disconnected; Service::COUNT],
            last_errors: [None; Service::COUNT],
        }
    }

    /// Run the poll policy for one service.
    pub fn poll(
        &mut self,
        service: Service,
        hw: &mut (impl LinkPort + EnvSensorPort + BrokerPort),
    ) -> PollOutcome {
        let previous = self.state(service);
        let result = match service {
            Service::Wifi => self.poll_wifi(hw),
            Service::Sensor => self.poll_sensor(hw),
            Service::Broker => self.poll_broker(hw),
        };

        let state = match result {
            Ok(state) => {
                self.last_errors[service as usize] = None;
                state
            }
            Err(e) => {
                warn!("Health: {} poll failed: {}", service.label(), e);
                self.last_errors[service as usize] = Some(e);
                ServiceState::Failed
            }
        };
        self.finish(service, previous, state)
    }

    /// A sample read failed outside a scheduled poll.
    pub fn report_sensor_fault(&mut self, hw: &mut impl EnvSensorPort, err: DeviceError) -> PollOutcome {
        warn!("Health: sensor fault: {}", err);
        hw.release();
        self.fail(Service::Sensor, err.into())
    }

    /// A message drain or publish failed outside a scheduled poll.
    pub fn report_broker_fault(&mut self, hw: &mut impl BrokerPort, err: BrokerError) -> PollOutcome {
        warn!("Health: broker fault: {}", err);
        hw.release();
        self.fail(Service::Broker, err.into())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self, service: Service) -> ServiceState {
        self.states[service as usize]
    }

    pub fn last_error(&self, service: Service) -> Option<Error> {
        self.last_errors[service as usize]
    }

    /// True iff WiFi, Sensor and Broker are all Connected.
    pub fn all_ready(&self) -> bool {
        self.states.iter().all(|s| *s == ServiceState::Connected)
    }

    // ── Policies ──────────────────────────────────────────────

    fn poll_wifi(&mut self, hw: &mut impl LinkPort) -> Result<ServiceState, Error> {
        if hw.is_associated() {
            return Ok(ServiceState::Connected);
        }
        self.set(Service::Wifi, ServiceState::Connecting);
        if self.ssid.is_empty() {
            return Err(TransportError::NoCredentials.into());
        }
        validate_ssid(&self.ssid)?;
        validate_password(&self.password)?;
        hw.associate(&self.ssid, &self.password)?;
        Ok(ServiceState::Connected)
    }

    fn poll_sensor(&mut self, hw: &mut impl EnvSensorPort) -> Result<ServiceState, Error> {
        self.set(Service::Sensor, ServiceState::Connecting);
        if let Err(e) = check_sensor_read(hw) {
            hw.release();
            return Err(e.into());
        }
        Ok(ServiceState::Connected)
    }

    fn poll_broker(&mut self, hw: &mut impl BrokerPort) -> Result<ServiceState, Error> {
        if self.state(Service::Wifi) != ServiceState::Connected {
            return Ok(ServiceState::NoTransport);
        }
        self.set(Service::Broker, ServiceState::Connecting);
        if let Err(e) = open_session(hw) {
            hw.release();
            return Err(e.into());
        }
        Ok(ServiceState::Connected)
    }

    // ── Internal ──────────────────────────────────────────────

    fn fail(&mut self, service: Service, err: Error) -> PollOutcome {
        let previous = self.state(service);
        self.last_errors[service as usize] = Some(err);
        self.finish(service, previous, ServiceState::Failed)
    }

    fn finish(&mut self, service: Service, previous: ServiceState, state: ServiceState) -> PollOutcome {
        self.set(service, state);
        let changed = previous != state;
        if changed {
            info!(
                "Health: {} {} -> {}",
                service.label(),
                previous.label(),
                state.label()
            );
        }
        PollOutcome {
            service,
            previous,
            state,
            changed,
        }
    }

    fn set(&mut self, service: Service, state: ServiceState) {
        self.states[service as usize] = state;
    }
}

/// Acquire the handle if needed and take one read to prove it works.
fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), TransportError> {
    if ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(TransportError::InvalidSsid);
    }
    Ok(())
}

/// Empty means an open network; otherwise WPA2 length rules.
fn validate_password(password: &str) -> Result<(), TransportError> {
    if password.is_empty() || (8..=64).contains(&password.len()) {
        return Ok(());
    }
    Err(TransportError::InvalidPassword)
}

fn check_sensor_read(hw: &mut impl EnvSensorPort) -> Result<(), DeviceError> {
    if !hw.is_acquired() {
        hw.acquire()?;
    }
    hw.read().map(|_| ())
}

/// Connect if needed, then (re)subscribe to every inbound topic.
fn open_session(hw: &mut impl BrokerPort) -> Result<(), BrokerError> {
    if !hw.is_open() {
        hw.connect()?;
    }
    for topic in SUBSCRIPTIONS {
        hw.subscribe(topic)?;
    }
    Ok(())
}
