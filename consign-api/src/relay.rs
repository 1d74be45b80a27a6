use consign_shared::topics;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// One broadcast channel per topic: the relay publishes into these and
/// any number of live subscribers listen on the matching stream. A
/// subscriber that is not connected simply misses the message; there is
/// no replay buffer.
#[derive(Clone)]
pub struct NotifyChannels {
    channels: Arc<HashMap<&'static str, broadcast::Sender<String>>>,
}

impl NotifyChannels {
    pub fn new(capacity: usize) -> Self {
        let mut channels = HashMap::new();
        for topic in topics::ALL {
            let (tx, _) = broadcast::channel(capacity);
            channels.insert(topic, tx);
        }
        Self {
            channels: Arc::new(channels),
        }
    }

    pub fn subscribe(&self, topic: &str) -> Option<broadcast::Receiver<String>> {
        self.channels.get(topic).map(|tx| tx.subscribe())
    }

    /// Forward a message verbatim to the broadcast destination for its
    /// topic. A send error only means nobody is listening right now.
    pub fn dispatch(&self, topic: &str, message: String) {
        match self.channels.get(topic) {
            Some(tx) => {
                let delivered = tx.send(message).unwrap_or(0);
                if let Some(dest) = topics::destination(topic) {
                    debug!("Broadcast to {}: {} subscribers", dest, delivered);
                }
            }
            None => warn!("Dropping message for unknown topic {}", topic),
        }
    }
}

/// Long-lived listener fanning transport messages out to connected
/// notification subscribers, independent of request handling.
pub async fn start_event_relay(brokers: String, group_id: String, notify: NotifyChannels) {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", &brokers)
        .set("group.id", &group_id)
        .set("enable.auto.commit", "true")
        .set("auto.offset.reset", "earliest")
        .create()
        .expect("Consumer creation failed");

    consumer.subscribe(&topics::ALL).expect("Can't subscribe");

    info!("Event relay started, listening on {} topics...", topics::ALL.len());

    loop {
        match consumer.recv().await {
            Err(e) => error!("Kafka error: {}", e),
            Ok(m) => {
                let topic = m.topic().to_string();
                if let Some(payload) = m.payload_view::<str>() {
                    match payload {
                        Ok(text) => {
                            info!("Consumed event on {}: {}", topic, text);
                            notify.dispatch(&topic, text.to_string());
                        }
                        Err(e) => error!("Error reading payload: {}", e),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dispatch_fans_out_to_all_topic_subscribers() {
        let notify = NotifyChannels::new(16);
        let mut first = notify.subscribe(topics::SHIPMENT_EVENTS).unwrap();
        let mut second = notify.subscribe(topics::SHIPMENT_EVENTS).unwrap();
        let mut other = notify.subscribe(topics::ROUTE_EVENTS).unwrap();

        notify.dispatch(
            topics::SHIPMENT_EVENTS,
            "Shipment 1 updated. New status: Delivered".to_string(),
        );

        assert_eq!(
            first.recv().await.unwrap(),
            "Shipment 1 updated. New status: Delivered"
        );
        assert_eq!(
            second.recv().await.unwrap(),
            "Shipment 1 updated. New status: Delivered"
        );
        // Other topics stay quiet.
        assert!(other.try_recv().is_err());
    }

    #[tokio::test]
    async fn dispatch_tolerates_missing_subscribers_and_unknown_topics() {
        let notify = NotifyChannels::new(16);

        // Nobody listening on a known topic.
        notify.dispatch(topics::VENDOR_EVENTS, "Vendor created: ID=1".to_string());
        // Topic outside the fixed set.
        notify.dispatch("mystery-events", "ignored".to_string());
    }
}
