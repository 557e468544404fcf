//! Kafka subscription to the Debezium topics of the `users` and `orders` tables.

use std::time::Duration;

use log::{debug, error, info, warn};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{BaseConsumer, Consumer};
use rdkafka::message::Message;

use crate::cdc::{self, Entity};
use crate::error::ProbeError;

pub const DEFAULT_BOOTSTRAP_SERVERS: &str = "localhost:9092";
pub const DEFAULT_GROUP_ID: &str = "synth-probe";
pub const DEFAULT_AUTO_OFFSET_RESET: &str = "earliest";
pub const DEFAULT_USERS_TOPIC: &str = "postgres.public.users";
pub const DEFAULT_ORDERS_TOPIC: &str = "postgres.public.orders";

const POLL_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerSettings {
    pub bootstrap_servers: String,
    pub group_id: String,
    /// `earliest`, `latest` or `error`, passed through as `auto.offset.reset`
    pub auto_offset_reset: String,
    pub users_topic: String,
    pub orders_topic: String,
}

impl Default for ConsumerSettings {
    fn default() -> Self {
        ConsumerSettings {
            bootstrap_servers: DEFAULT_BOOTSTRAP_SERVERS.to_string(),
            group_id: DEFAULT_GROUP_ID.to_string(),
            auto_offset_reset: DEFAULT_AUTO_OFFSET_RESET.to_string(),
            users_topic: DEFAULT_USERS_TOPIC.to_string(),
            orders_topic: DEFAULT_ORDERS_TOPIC.to_string(),
        }
    }
}

impl ConsumerSettings {
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.bootstrap_servers)
            .set("group.id", &self.group_id)
            .set("auto.offset.reset", &self.auto_offset_reset);
        config
    }

    #[must_use]
    pub fn topics(&self) -> [&str; 2] {
        [self.users_topic.as_str(), self.orders_topic.as_str()]
    }

    #[must_use]
    pub fn entity_for_topic(&self, topic: &str) -> Option<Entity> {
        if topic == self.users_topic {
            Some(Entity::Users)
        } else if topic == self.orders_topic {
            Some(Entity::Orders)
        } else {
            None
        }
    }

    /// Hands one message to the decoder of the table its topic belongs to. Returns the
    /// entity it was routed to; tombstones and messages on unknown topics are skipped.
    pub fn route(&self, topic: &str, payload: Option<&str>) -> Option<Entity> {
        let entity = match self.entity_for_topic(topic) {
            Some(entity) => entity,
            None => {
                warn!("Message on unexpected topic {}", topic);
                return None;
            }
        };
        match payload {
            Some(payload) => {
                cdc::process(entity, payload);
                Some(entity)
            }
            None => {
                debug!("Tombstone on {}", topic);
                None
            }
        }
    }
}

/// Subscribes to both topics and logs every change event until `limit` messages have been
/// routed, or forever when there is no limit.
///
/// # Errors
/// Errors when the consumer cannot be created or subscribed. Errors while polling are
/// logged and polling continues.
pub fn consume(settings: &ConsumerSettings, limit: Option<usize>) -> Result<(), ProbeError> {
    let consumer: BaseConsumer = settings.client_config().create()?;
    consumer.subscribe(&settings.topics())?;
    info!(
        "Subscribed to {} and {} as group {}",
        settings.users_topic, settings.orders_topic, settings.group_id
    );

    let mut routed = 0;
    while limit.map_or(true, |limit| routed < limit) {
        match consumer.poll(POLL_TIMEOUT) {
            None => {}
            Some(Err(e)) => warn!("Kafka error: {}", e),
            Some(Ok(message)) => match message.payload_view::<str>() {
                Some(Err(e)) => error!("Message on {} is not UTF-8: {}", message.topic(), e),
                payload => {
                    let payload = payload.and_then(Result::ok);
                    if settings.route(message.topic(), payload).is_some() {
                        routed += 1;
                    }
                }
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ConsumerSettings {
        ConsumerSettings {
            users_topic: "cdc.public.users".to_string(),
            orders_topic: "cdc.public.orders".to_string(),
            ..ConsumerSettings::default()
        }
    }

    #[test]
    fn test_entity_for_topic() {
        let settings = settings();
        assert_eq!(
            settings.entity_for_topic("cdc.public.users"),
            Some(Entity::Users)
        );
        assert_eq!(
            settings.entity_for_topic("cdc.public.orders"),
            Some(Entity::Orders)
        );
        assert_eq!(settings.entity_for_topic("cdc.public.products"), None);
        assert_eq!(settings.topics(), ["cdc.public.users", "cdc.public.orders"]);
    }

    #[test]
    fn test_route() {
        let settings = settings();
        let order = r#"{"payload": {"after": {"id": 1, "user_id": 2, "quantity": 3}}}"#;
        assert_eq!(
            settings.route("cdc.public.orders", Some(order)),
            Some(Entity::Orders)
        );
        assert_eq!(
            settings.route("cdc.public.users", Some("not json")),
            Some(Entity::Users)
        );
        assert_eq!(settings.route("cdc.public.users", None), None);
        assert_eq!(settings.route("elsewhere", Some(order)), None);
    }

    #[test]
    fn test_client_config() {
        let config = ConsumerSettings {
            bootstrap_servers: "kafka-1:9092,kafka-2:9092".to_string(),
            auto_offset_reset: "latest".to_string(),
            ..ConsumerSettings::default()
        }
        .client_config();
        assert_eq!(
            config.get("bootstrap.servers"),
            Some("kafka-1:9092,kafka-2:9092")
        );
        assert_eq!(config.get("group.id"), Some(DEFAULT_GROUP_ID));
        assert_eq!(config.get("auto.offset.reset"), Some("latest"));
    }
}
