use irrigation_api::{DeviceInfo, DeviceRegistration};
use time::OffsetDateTime;
use uuid::Uuid;

/// Field devices seen by this process, in registration order.
///
/// Disconnected records stay until pruned so dashboards can show when a
/// device dropped off. At most one record per device id is live.
#[derive(Debug, Default, Clone)]
pub struct DeviceRegistry {
    records: Vec<DeviceInfo>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every record for the device id, live or historical.
    pub fn register(
        &mut self,
        registration: DeviceRegistration,
        connection_id: Uuid,
        now: OffsetDateTime,
    ) {
        self.records
            .retain(|record| record.device_id != registration.device_id);

        self.records.push(DeviceInfo {
            connection_id,
            device_id: registration.device_id,
            device_type: registration.device_type,
            last_seen: now,
            connected: true,
            disconnected_at: None,
        });
    }

    /// Returns `false` when no live record belongs to the connection.
    pub fn mark_disconnected(&mut self, connection_id: Uuid, now: OffsetDateTime) -> bool {
        let mut changed = false;

        for record in self
            .records
            .iter_mut()
            .filter(|record| record.connection_id == connection_id && record.connected)
        {
            record.connected = false;
            record.disconnected_at = Some(now);
            changed = true;
        }

        changed
    }

    /// Refreshes `last_seen` of the live record for a device.
    pub fn touch(&mut self, device_id: &str, now: OffsetDateTime) -> bool {
        match self
            .records
            .iter_mut()
            .find(|record| record.connected && record.device_id == device_id)
        {
            Some(record) => {
                record.last_seen = now;
                true
            }
            None => false,
        }
    }

    /// Drops disconnected records whose disconnect happened at or before `cutoff`.
    pub fn prune_disconnected_before(&mut self, cutoff: OffsetDateTime) -> usize {
        let before = self.records.len();

        self.records.retain(|record| match record.disconnected_at {
            Some(disconnected_at) if !record.connected => disconnected_at > cutoff,
            _ => true,
        });

        before - self.records.len()
    }

    pub fn list_all(&self) -> Vec<DeviceInfo> {
        self.records.clone()
    }
}

#[cfg(test)]
mod tests {
    use time::Duration;
    use time::macros::datetime;

    use super::*;

    fn registration(device_id: &str) -> DeviceRegistration {
        DeviceRegistration {
            device_id: device_id.to_string(),
            device_type: "esp32".to_string(),
        }
    }

    fn live_count(registry: &DeviceRegistry, device_id: &str) -> usize {
        registry
            .list_all()
            .iter()
            .filter(|record| record.device_id == device_id && record.connected)
            .count()
    }

    #[test]
    fn test_reregistration_keeps_single_live_record() {
        let mut registry = DeviceRegistry::new();
        let now = datetime!(2024-05-01 12:00:00 UTC);
        let connections: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();

        for (step, connection_id) in connections.iter().enumerate() {
            let at = now + Duration::seconds(step as i64);
            registry.register(registration("esp-1"), *connection_id, at);
            if step % 2 == 0 {
                registry.mark_disconnected(*connection_id, at);
            }
            registry.register(registration("esp-1"), *connection_id, at);
            assert_eq!(live_count(&registry, "esp-1"), 1);
        }

        let records = registry.list_all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].connection_id, connections[3]);
    }

    #[test]
    fn test_reregistration_overwrites_connection() {
        let mut registry = DeviceRegistry::new();
        let now = datetime!(2024-05-01 12:00:00 UTC);
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        registry.register(registration("esp-1"), first, now);
        registry.register(registration("esp-1"), second, now + Duration::seconds(5));

        // The stale connection no longer owns a record
        assert!(!registry.mark_disconnected(first, now + Duration::seconds(6)));
        assert_eq!(live_count(&registry, "esp-1"), 1);
        assert_eq!(registry.list_all()[0].connection_id, second);
    }

    #[test]
    fn test_unknown_connection_disconnect_is_noop() {
        let mut registry = DeviceRegistry::new();
        let now = datetime!(2024-05-01 12:00:00 UTC);
        registry.register(registration("esp-1"), Uuid::new_v4(), now);
        let before = registry.list_all();

        assert!(!registry.mark_disconnected(Uuid::new_v4(), now));
        assert_eq!(registry.list_all(), before);
    }

    #[test]
    fn test_disconnect_retains_record() {
        let mut registry = DeviceRegistry::new();
        let now = datetime!(2024-05-01 12:00:00 UTC);
        let esp1 = Uuid::new_v4();
        let esp2 = Uuid::new_v4();

        registry.register(registration("esp-1"), esp1, now);
        registry.register(registration("esp-2"), esp2, now);
        assert!(registry.mark_disconnected(esp1, now + Duration::minutes(1)));

        let records = registry.list_all();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].device_id, "esp-1");
        assert!(!records[0].connected);
        assert_eq!(records[0].disconnected_at, Some(now + Duration::minutes(1)));
        assert_eq!(records[1].device_id, "esp-2");
        assert!(records[1].connected);
        assert!(records[1].disconnected_at.is_none());
    }

    #[test]
    fn test_touch_only_updates_live_record() {
        let mut registry = DeviceRegistry::new();
        let now = datetime!(2024-05-01 12:00:00 UTC);
        let connection_id = Uuid::new_v4();
        registry.register(registration("esp-1"), connection_id, now);

        assert!(registry.touch("esp-1", now + Duration::minutes(2)));
        assert_eq!(registry.list_all()[0].last_seen, now + Duration::minutes(2));

        registry.mark_disconnected(connection_id, now + Duration::minutes(3));
        assert!(!registry.touch("esp-1", now + Duration::minutes(4)));
        assert!(!registry.touch("esp-9", now));
    }

    #[test]
    fn test_prune_drops_only_old_disconnected_records() {
        let mut registry = DeviceRegistry::new();
        let now = datetime!(2024-05-01 12:00:00 UTC);
        let old = Uuid::new_v4();
        let recent = Uuid::new_v4();

        registry.register(registration("esp-old"), old, now);
        registry.register(registration("esp-recent"), recent, now);
        registry.register(registration("esp-live"), Uuid::new_v4(), now);
        registry.mark_disconnected(old, now + Duration::minutes(1));
        registry.mark_disconnected(recent, now + Duration::minutes(30));

        let removed = registry.prune_disconnected_before(now + Duration::minutes(10));

        assert_eq!(removed, 1);
        let ids: Vec<String> = registry.list_all().into_iter().map(|r| r.device_id).collect();
        assert_eq!(ids, vec!["esp-recent".to_string(), "esp-live".to_string()]);
    }
}
