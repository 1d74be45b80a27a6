pub mod error;
pub mod events;
pub mod repository;

pub use error::StoreError;
pub use events::EventSink;
