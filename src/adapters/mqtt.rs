//! MQTT broker adapter (rumqttc synchronous client).
//!
//! Every blocking step is bounded: the connect handshake waits at most
//! the configured connect timeout for a CONNACK, and each drain waits at
//! most [`DRAIN_SLICE`] per event. Publishes and subscriptions are queued
//! on the client and flushed while the connection is drained.

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rumqttc::{
    Client, ConnectReturnCode, Connection, Event, MqttOptions, Packet, QoS, RecvTimeoutError,
};

use crate::app::ports::BrokerPort;
use crate::config::StationConfig;
use crate::error::BrokerError;
use crate::ingest::InboundMessage;

/// Longest a single drain waits for the next event.
pub const DRAIN_SLICE: Duration = Duration::from_millis(10);
/// Bookkeeping events (acks, pings) skipped per drain before giving up.
const MAX_EVENTS_PER_DRAIN: usize = 16;
const KEEP_ALIVE: Duration = Duration::from_secs(30);
/// Request channel depth.
const CHANNEL_CAP: usize = 16;

struct Session {
    client: Client,
    connection: Connection,
}

pub struct MqttBroker {
    host: String,
    port: u16,
    client_id: String,
    connect_timeout: Duration,
    session: Option<Session>,
}

impl MqttBroker {
    pub fn new(config: &StationConfig) -> Self {
        Self {
            host: config.broker_host.clone(),
            port: config.broker_port,
            client_id: config.client_id.clone(),
            connect_timeout: Duration::from_millis(u64::from(config.broker_connect_timeout_ms)),
            session: None,
        }
    }

    fn session(&mut self) -> Result<&mut Session, BrokerError> {
        self.session.as_mut().ok_or(BrokerError::NotConnected)
    }
}

/// Wait for the CONNACK, bounded by `timeout`.
fn await_connack(connection: &mut Connection, timeout: Duration) -> Result<(), BrokerError> {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(BrokerError::ConnectFailed);
        }
        match connection.recv_timeout(remaining) {
            Ok(Ok(Event::Incoming(Packet::ConnAck(ack)))) => {
                return if ack.code == ConnectReturnCode::Success {
                    Ok(())
                } else {
                    warn!("MQTT: broker refused connection: {:?}", ack.code);
                    Err(BrokerError::ConnectFailed)
                };
            }
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                warn!("MQTT: connect failed: {}", e);
                return Err(BrokerError::ConnectFailed);
            }
            Err(_) => return Err(BrokerError::ConnectFailed),
        }
    }
}

impl BrokerPort for MqttBroker {
    fn connect(&mut self) -> Result<(), BrokerError> {
        let mut options = MqttOptions::new(self.client_id.as_str(), self.host.as_str(), self.port);
        options.set_keep_alive(KEEP_ALIVE);
        let (client, mut connection) = Client::new(options, CHANNEL_CAP);

        await_connack(&mut connection, self.connect_timeout)?;
        info!("MQTT: connected to {}:{}", self.host, self.port);
        self.session = Some(Session { client, connection });
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), BrokerError> {
        self.session()?
            .client
            .subscribe(topic, QoS::AtMostOnce)
            .map_err(|_| BrokerError::SubscribeFailed)
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BrokerError> {
        self.session()?
            .client
            .publish(topic, QoS::AtMostOnce, false, payload.to_vec())
            .map_err(|_| BrokerError::PublishFailed)
    }

    fn try_recv(&mut self) -> Result<Option<InboundMessage>, BrokerError> {
        let session = self.session()?;
        for _ in 0..MAX_EVENTS_PER_DRAIN {
            match session.connection.recv_timeout(DRAIN_SLICE) {
                Ok(Ok(Event::Incoming(Packet::Publish(p)))) => {
                    debug!("MQTT: {} ({} bytes)", p.topic, p.payload.len());
                    return Ok(Some(InboundMessage::new(p.topic, p.payload.to_vec())));
                }
                Ok(Ok(Event::Incoming(Packet::Disconnect))) => {
                    return Err(BrokerError::ConnectionLost);
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    warn!("MQTT: connection error: {}", e);
                    return Err(BrokerError::ConnectionLost);
                }
                Err(RecvTimeoutError::Timeout) => return Ok(None),
                Err(RecvTimeoutError::Disconnected) => return Err(BrokerError::ConnectionLost),
            }
        }
        Ok(None)
    }

    fn release(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(e) = session.client.disconnect() {
                debug!("MQTT: disconnect on release failed: {}", e);
            }
        }
    }

    fn is_open(&self) -> bool {
        self.session.is_some()
    }
}
