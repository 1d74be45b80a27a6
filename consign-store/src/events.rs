use consign_core::EventSink;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

struct Outbound {
    topic: String,
    payload: String,
}

/// Kafka-backed event producer. Publishing hands the record to a
/// background sender task over a bounded queue, so the write path never
/// waits on the transport; a full queue or a dead broker costs the
/// event, not the operation.
#[derive(Clone)]
pub struct EventProducer {
    tx: mpsc::Sender<Outbound>,
}

impl EventProducer {
    pub fn new(brokers: &str) -> Result<Self, rdkafka::error::KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        let (tx, rx) = mpsc::channel(256);
        tokio::spawn(run_sender(producer, rx));

        Ok(Self { tx })
    }
}

async fn run_sender(producer: FutureProducer, mut rx: mpsc::Receiver<Outbound>) {
    while let Some(event) = rx.recv().await {
        let record = FutureRecord::<(), _>::to(&event.topic).payload(&event.payload);

        match producer
            .send(record, Timeout::After(Duration::from_secs(0)))
            .await
        {
            Ok(delivery) => {
                info!(
                    "Sent message to {}: partition {} offset {}",
                    event.topic, delivery.partition, delivery.offset
                );
            }
            Err((e, _msg)) => {
                // No retry queue: the store is the source of truth and
                // observers can re-derive state by polling.
                error!("Failed to send message to {}: {}", event.topic, e);
            }
        }
    }
}

impl EventSink for EventProducer {
    fn publish(&self, topic: &str, message: &str) {
        info!("Producing message -> {} to topic -> {}", message, topic);

        let outbound = Outbound {
            topic: topic.to_string(),
            payload: message.to_string(),
        };
        if let Err(e) = self.tx.try_send(outbound) {
            warn!("Dropping event for {}: {}", topic, e);
        }
    }
}
