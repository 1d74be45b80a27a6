/// Publish seam between business operations and the message transport.
///
/// `publish` is fire-and-forget: implementations must return without
/// waiting on the transport and must swallow transport failures, so a
/// lost notification never fails the operation that triggered it. The
/// store remains the source of truth and observers re-fetch on notify.
pub trait EventSink: Send + Sync {
    fn publish(&self, topic: &str, message: &str);
}
