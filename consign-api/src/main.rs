use consign_api::{
    app, relay,
    state::{AppState, AuthConfig},
};
use consign_core::repository::{
    CargoRepository, DeliveryRepository, RouteRepository, ShipmentRepository, VendorRepository,
};
use consign_core::EventSink;
use consign_store::cargo_repo::PgCargoRepository;
use consign_store::delivery_repo::PgDeliveryRepository;
use consign_store::route_repo::PgRouteRepository;
use consign_store::shipment_repo::PgShipmentRepository;
use consign_store::vendor_repo::PgVendorRepository;
use consign_tracking::{DeliveryManager, ShipmentManager};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "consign_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = consign_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Consign API on port {}", config.server.port);

    // Postgres Connection
    let db = consign_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    // Kafka Producer (background sender task)
    let kafka_producer = consign_store::EventProducer::new(&config.kafka.brokers)
        .expect("Failed to create Kafka producer");
    let events: Arc<dyn EventSink> = Arc::new(kafka_producer);

    // Broadcast channels + relay consumer
    let notify = relay::NotifyChannels::new(100);
    tokio::spawn(relay::start_event_relay(
        config.kafka.brokers.clone(),
        config.kafka.group_id.clone(),
        notify.clone(),
    ));

    let shipments: Arc<dyn ShipmentRepository> =
        Arc::new(PgShipmentRepository::new(db.pool.clone()));
    let cargo: Arc<dyn CargoRepository> = Arc::new(PgCargoRepository::new(db.pool.clone()));
    let routes: Arc<dyn RouteRepository> = Arc::new(PgRouteRepository::new(db.pool.clone()));
    let vendors: Arc<dyn VendorRepository> = Arc::new(PgVendorRepository::new(db.pool.clone()));
    let deliveries: Arc<dyn DeliveryRepository> =
        Arc::new(PgDeliveryRepository::new(db.pool.clone()));

    let delivery_manager = Arc::new(DeliveryManager::new(deliveries.clone(), shipments.clone()));
    let tracker = Arc::new(ShipmentManager::new(
        shipments.clone(),
        delivery_manager.clone(),
        events.clone(),
    ));

    let app_state = AppState {
        shipments,
        cargo,
        routes,
        vendors,
        deliveries,
        tracker,
        delivery_manager,
        events,
        notify,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
