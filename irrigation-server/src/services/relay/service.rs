use std::collections::HashMap;

use irrigation_api::{ClientMessage, DeviceInfo, Id, LimitSettings, ServerMessage};
use time::OffsetDateTime;
use tokio::sync::{broadcast, mpsc, oneshot};
use uuid::Uuid;

use super::{ControlState, DeviceRegistry, validate_limits};
use crate::configs::Relay;
use crate::errors::RelayError;
use crate::models::{Limit, SensorSample};
use crate::services::SampleWriter;

/// A party attached to the relay.
pub struct Connection {
    pub id: Uuid,
    /// Every broadcast issued after the initial sync was taken.
    pub receiver: broadcast::Receiver<ServerMessage>,
    /// Frames owed to this connection only, in send order.
    pub initial_sync: Vec<ServerMessage>,
}

#[derive(Debug, Clone)]
pub struct RelaySnapshot {
    pub control: ControlState,
    pub devices: Vec<DeviceInfo>,
    pub last_sample: Option<SensorSample>,
    pub connections: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ConnectionState {
    Unidentified,
    IdentifiedDevice { device_id: String },
}

enum RelayCommand {
    Connect {
        reply: oneshot::Sender<Connection>,
    },
    Dispatch {
        connection_id: Uuid,
        message: ClientMessage,
    },
    Disconnect {
        connection_id: Uuid,
    },
    Snapshot {
        reply: oneshot::Sender<RelaySnapshot>,
    },
}

/// Cloneable entry point into the relay loop.
#[derive(Clone)]
pub struct RelayHandle {
    commands: mpsc::Sender<RelayCommand>,
}

impl RelayHandle {
    pub async fn connect(&self) -> Result<Connection, RelayError> {
        let (reply, response) = oneshot::channel();
        self.send(RelayCommand::Connect { reply }).await?;
        response.await.map_err(|_| RelayError::ChannelClosed)
    }

    pub async fn dispatch(
        &self,
        connection_id: Uuid,
        message: ClientMessage,
    ) -> Result<(), RelayError> {
        self.send(RelayCommand::Dispatch {
            connection_id,
            message,
        })
        .await
    }

    pub async fn disconnect(&self, connection_id: Uuid) -> Result<(), RelayError> {
        self.send(RelayCommand::Disconnect { connection_id }).await
    }

    pub async fn snapshot(&self) -> Result<RelaySnapshot, RelayError> {
        let (reply, response) = oneshot::channel();
        self.send(RelayCommand::Snapshot { reply }).await?;
        response.await.map_err(|_| RelayError::ChannelClosed)
    }

    async fn send(&self, command: RelayCommand) -> Result<(), RelayError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| RelayError::ChannelClosed)
    }
}

/// Owns the device registry, control state and last sample.
///
/// All mutation happens on the task spawned by [`RelayService::start`], one
/// command at a time, so every party observes broadcasts in the order the
/// commands were queued.
pub struct RelayService {
    registry: DeviceRegistry,
    control: ControlState,
    last_sample: Option<SensorSample>,
    connections: HashMap<Uuid, ConnectionState>,
    broadcaster: broadcast::Sender<ServerMessage>,
    writer: SampleWriter,
    limit_id: Id,
    command_capacity: usize,
    retention: Option<time::Duration>,
    prune_interval: std::time::Duration,
}

impl RelayService {
    pub fn new(settings: &Relay, writer: SampleWriter, limits: Option<LimitSettings>) -> Self {
        let (broadcaster, _) = broadcast::channel(settings.channel_capacity.max(1));

        Self {
            registry: DeviceRegistry::new(),
            control: limits.map(ControlState::with_limits).unwrap_or_default(),
            last_sample: None,
            connections: HashMap::new(),
            broadcaster,
            writer,
            limit_id: settings.limit_id,
            command_capacity: settings.command_capacity.max(1),
            retention: settings
                .device_retention_secs
                .map(|secs| time::Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX))),
            prune_interval: std::time::Duration::from_secs(settings.prune_interval_secs.max(1)),
        }
    }

    pub fn start(self) -> RelayHandle {
        let (commands, receiver) = mpsc::channel(self.command_capacity);
        tokio::spawn(self.run(receiver));

        RelayHandle { commands }
    }

    async fn run(mut self, mut commands: mpsc::Receiver<RelayCommand>) {
        let mut prune = tokio::time::interval(self.prune_interval);
        prune.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                _ = prune.tick(), if self.retention.is_some() => self.prune_history(),
            }
        }

        tracing::info!("Relay loop stopped");
    }

    fn handle_command(&mut self, command: RelayCommand) {
        match command {
            RelayCommand::Connect { reply } => {
                let connection = self.connect();
                let connection_id = connection.id;
                if reply.send(connection).is_err() {
                    // Caller went away before the connection was handed over
                    self.disconnect(connection_id);
                }
            }
            RelayCommand::Dispatch {
                connection_id,
                message,
            } => self.handle_message(connection_id, message),
            RelayCommand::Disconnect { connection_id } => self.disconnect(connection_id),
            RelayCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    fn connect(&mut self) -> Connection {
        let id = Uuid::new_v4();
        // Subscribe first so nothing falls between the sync and the stream
        let receiver = self.broadcaster.subscribe();

        let mut initial_sync = self.control.sync_messages();
        initial_sync.push(ServerMessage::ConnectedDevices(self.registry.list_all()));
        if let Some(sample) = &self.last_sample {
            initial_sync.push(ServerMessage::SensorAndControlStatus(
                self.control.status(sample),
            ));
        }

        self.connections.insert(id, ConnectionState::Unidentified);
        tracing::info!("Connection {} attached ({} open)", id, self.connections.len());

        Connection {
            id,
            receiver,
            initial_sync,
        }
    }

    fn handle_message(&mut self, connection_id: Uuid, message: ClientMessage) {
        tracing::debug!(
            "Connection {} sent {}",
            connection_id,
            message.event_name()
        );

        match message {
            ClientMessage::RegisterDevice(registration) => {
                let device_id = registration.device_id.clone();
                self.registry
                    .register(registration, connection_id, OffsetDateTime::now_utc());
                if let Some(state) = self.connections.get_mut(&connection_id) {
                    *state = ConnectionState::IdentifiedDevice {
                        device_id: device_id.clone(),
                    };
                }
                tracing::info!("Device {} registered on {}", device_id, connection_id);
                self.broadcast(ServerMessage::DeviceUpdate(self.registry.list_all()));
            }
            ClientMessage::ToggleLed(on) => {
                self.control.set_led(on);
                self.broadcast(ServerMessage::LedState(on));
            }
            ClientMessage::TogglePumpMode(auto) => {
                self.control.set_pump_auto_mode(auto);
                self.broadcast(ServerMessage::PumpMode(auto));
            }
            ClientMessage::ToggleReservoir1(on) => {
                self.control.set_reservoir1(on);
                self.broadcast(ServerMessage::Reservoir1State(on));
            }
            ClientMessage::ToggleReservoir2(on) => {
                self.control.set_reservoir2(on);
                self.broadcast(ServerMessage::Reservoir2State(on));
            }
            ClientMessage::SensorSample(reading) => {
                let now = OffsetDateTime::now_utc();
                let sample = SensorSample::received(reading, now);
                self.registry.touch(&sample.device_id, now);

                let status = self.control.status(&sample);
                self.writer.write_sample(sample.clone());
                self.last_sample = Some(sample);
                self.broadcast(ServerMessage::SensorAndControlStatus(status));
            }
            ClientMessage::SetLimit(limits) => {
                if let Err(e) = validate_limits(&limits) {
                    tracing::warn!("Dropping limits from {}: {}", connection_id, e);
                    return;
                }
                self.control.set_limits(limits);
                self.writer.write_limit(Limit::new(self.limit_id, &limits));
            }
        }
    }

    fn disconnect(&mut self, connection_id: Uuid) {
        let state = self.connections.remove(&connection_id);
        tracing::info!(
            "Connection {} detached ({} open)",
            connection_id,
            self.connections.len()
        );

        if let Some(ConnectionState::IdentifiedDevice { device_id }) = &state {
            tracing::debug!("Device {} went offline", device_id);
        }

        if self
            .registry
            .mark_disconnected(connection_id, OffsetDateTime::now_utc())
        {
            self.broadcast(ServerMessage::DeviceUpdate(self.registry.list_all()));
        }
    }

    fn prune_history(&mut self) {
        let Some(retention) = self.retention else {
            return;
        };

        // Retention longer than the clock's range keeps everything
        let Some(cutoff) = OffsetDateTime::now_utc().checked_sub(retention) else {
            return;
        };

        let removed = self.registry.prune_disconnected_before(cutoff);
        if removed > 0 {
            tracing::debug!("Pruned {} disconnected device records", removed);
            self.broadcast(ServerMessage::DeviceUpdate(self.registry.list_all()));
        }
    }

    fn snapshot(&self) -> RelaySnapshot {
        RelaySnapshot {
            control: self.control.snapshot(),
            devices: self.registry.list_all(),
            last_sample: self.last_sample.clone(),
            connections: self.connections.len(),
        }
    }

    fn broadcast(&self, message: ServerMessage) {
        // Err only means nobody is listening
        if self.broadcaster.send(message).is_err() {
            tracing::trace!("Broadcast with no receivers");
        }
    }
}
