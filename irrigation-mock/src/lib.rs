use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use irrigation_api::{ClientMessage, ServerMessage, decode, encode};
use time::OffsetDateTime;
use tokio::time::{interval, sleep};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::device::SimulatedDevice;
use crate::settings::Settings;
use crate::simulate::day_fraction;

mod device;
pub mod settings;
mod simulate;

type SessionError = Box<dyn Error + Send + Sync>;

pub async fn run(settings: &Arc<Settings>) {
    let mut device = SimulatedDevice::new(&settings.device);
    let reconnect = &settings.reconnect;
    let delay = Duration::from_millis(reconnect.delay_ms);
    let mut failed_attempts = 0;

    loop {
        match connect_async(settings.device.server_url.as_str()).await {
            Ok((socket, _)) => {
                failed_attempts = 0;
                tracing::info!("Connected to {} as {}", settings.device.server_url, device.id());

                match session(socket, settings, &mut device).await {
                    Ok(()) => tracing::info!("Server closed the connection"),
                    Err(e) => tracing::warn!("Connection lost: {}", e),
                }
            }
            Err(e) => {
                failed_attempts += 1;
                if failed_attempts >= reconnect.attempts {
                    tracing::error!(
                        "Giving up after {} reconnection attempts: {}",
                        reconnect.attempts,
                        e
                    );
                    return;
                }
                tracing::debug!(
                    "Connect attempt {}/{} failed: {}",
                    failed_attempts,
                    reconnect.attempts,
                    e
                );
            }
        }

        sleep(delay).await;
    }
}

async fn session<S>(
    socket: S,
    settings: &Settings,
    device: &mut SimulatedDevice,
) -> Result<(), SessionError>
where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>>
        + futures::Sink<Message, Error = tokio_tungstenite::tungstenite::Error>
        + Unpin,
{
    let (mut sink, mut stream) = socket.split();

    sink.send(Message::Text(encode(&device.registration())?)).await?;

    let mut ticker = interval(Duration::from_secs(settings.device.interval_secs.max(1)));

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => match decode::<ServerMessage>(&text) {
                    Ok(message) => {
                        device.apply(&message);
                    }
                    Err(e) => tracing::warn!("Ignoring frame: {}", e),
                },
                Some(Ok(Message::Close(_))) | None => return Ok(()),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
            },
            _ = ticker.tick() => {
                let reading = device.next_reading(
                    day_fraction(OffsetDateTime::now_utc()),
                    &mut rand::rng(),
                );
                tracing::debug!("Send: {:?}", reading);

                let frame = encode(&ClientMessage::SensorSample(reading))?;
                sink.send(Message::Text(frame)).await?;
            }
        }
    }
}
