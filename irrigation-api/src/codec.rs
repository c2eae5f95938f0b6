use core::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Message could not be turned into a frame
    Encode(String),
    /// Frame is not valid JSON or does not match any known event
    Decode(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(e) => write!(f, "Encode error: {}", e),
            Self::Decode(e) => write!(f, "Decode error: {}", e),
        }
    }
}

impl std::error::Error for CodecError {}

/// Serializes a message into a JSON text frame.
pub fn encode<T: Serialize>(message: &T) -> Result<String, CodecError> {
    serde_json::to_string(message).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Parses a JSON text frame.
pub fn decode<T: DeserializeOwned>(frame: &str) -> Result<T, CodecError> {
    serde_json::from_str(frame).map_err(|e| CodecError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use time::macros::datetime;
    use uuid::Uuid;

    use super::*;
    use crate::message::{ClientMessage, ServerMessage};
    use crate::models::*;

    #[test]
    fn test_decode_register_device() {
        let frame = r#"{"event":"register-device","data":{"deviceId":"esp-1","deviceType":"esp32"}}"#;

        let message: ClientMessage = decode(frame).unwrap();

        assert_eq!(
            message,
            ClientMessage::RegisterDevice(DeviceRegistration {
                device_id: "esp-1".to_string(),
                device_type: "esp32".to_string(),
            })
        );
    }

    #[test]
    fn test_decode_reservoir_toggles() {
        let first: ClientMessage = decode(r#"{"event":"toggle-reservoir1","data":true}"#).unwrap();
        let second: ClientMessage =
            decode(r#"{"event":"toggle-reservoir2","data":false}"#).unwrap();

        assert_eq!(first, ClientMessage::ToggleReservoir1(true));
        assert_eq!(second, ClientMessage::ToggleReservoir2(false));
    }

    #[test]
    fn test_decode_sensor_sample() {
        let frame = r#"{"event":"sensor-sample","data":{"soilMoisture":42,"temperature":23.5,"waterLevel":77,"deviceId":"esp-1"}}"#;

        let message: ClientMessage = decode(frame).unwrap();

        match message {
            ClientMessage::SensorSample(reading) => {
                assert_eq!(reading.soil_moisture, 42.0);
                assert_eq!(reading.temperature, 23.5);
                assert_eq!(reading.water_level, 77.0);
                assert_eq!(reading.device_id, "esp-1");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_missing_fields() {
        let frame = r#"{"event":"sensor-sample","data":{"soilMoisture":42,"deviceId":"esp-1"}}"#;

        let result: Result<ClientMessage, _> = decode(frame);

        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_unknown_event() {
        let result: Result<ClientMessage, _> = decode(r#"{"event":"toggleLED","data":true}"#);

        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_wrong_payload_type() {
        let result: Result<ClientMessage, _> = decode(r#"{"event":"toggle-led","data":"on"}"#);

        assert!(result.is_err());
    }

    #[test]
    fn test_encode_server_events() {
        let frame = encode(&ServerMessage::LedState(true)).unwrap();
        let led: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(led, json!({ "event": "led-state", "data": true }));

        let reservoir: Value =
            serde_json::from_str(&encode(&ServerMessage::Reservoir1State(false)).unwrap()).unwrap();
        assert_eq!(reservoir, json!({ "event": "reservoir1-state", "data": false }));

        let status = ServerMessage::SensorAndControlStatus(ControlStatus {
            soil_moisture: 42.0,
            temperature: 23.5,
            water_level: 77.0,
            led_on: true,
            pump_auto_mode: false,
        });
        let status: Value = serde_json::from_str(&encode(&status).unwrap()).unwrap();
        assert_eq!(status["event"], json!("sensor-and-control-status"));
        assert_eq!(status["data"]["soilMoisture"], json!(42.0));
        assert_eq!(status["data"]["ledOn"], json!(true));
        assert_eq!(status["data"]["pumpAutoMode"], json!(false));
    }

    #[test]
    fn test_encode_device_list() {
        let connection_id = Uuid::new_v4();
        let devices = vec![
            DeviceInfo {
                connection_id,
                device_id: "esp-1".to_string(),
                device_type: "esp32".to_string(),
                last_seen: datetime!(2024-05-01 10:00:00 UTC),
                connected: false,
                disconnected_at: Some(datetime!(2024-05-01 10:05:00 UTC)),
            },
            DeviceInfo {
                connection_id,
                device_id: "esp-2".to_string(),
                device_type: "esp32".to_string(),
                last_seen: datetime!(2024-05-01 10:01:00 UTC),
                connected: true,
                disconnected_at: None,
            },
        ];

        let frame: Value =
            serde_json::from_str(&encode(&ServerMessage::DeviceUpdate(devices)).unwrap()).unwrap();

        assert_eq!(frame["event"], json!("device-update"));
        assert_eq!(frame["data"][0]["deviceId"], json!("esp-1"));
        assert_eq!(frame["data"][0]["connected"], json!(false));
        assert_eq!(frame["data"][0]["disconnectedAt"], json!("2024-05-01T10:05:00Z"));
        assert_eq!(frame["data"][1]["connected"], json!(true));
        assert!(frame["data"][1].get("disconnectedAt").is_none());
    }

    #[test]
    fn test_event_names_match_wire_tags() {
        let messages = [
            ClientMessage::ToggleLed(true),
            ClientMessage::TogglePumpMode(false),
            ClientMessage::ToggleReservoir1(true),
            ClientMessage::SetLimit(LimitSettings::default()),
        ];

        for message in messages {
            let frame: Value = serde_json::from_str(&encode(&message).unwrap()).unwrap();
            assert_eq!(frame["event"], json!(message.event_name()));
        }
    }
}
