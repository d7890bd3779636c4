//! Debounced cart writer
//!
//! Quantity edits go into a [`Debouncer`] whose single slot holds the one
//! outstanding [`PendingUpdate`]. When the edits settle, the value is handed to
//! a writer task that performs the PATCH and reports back through
//! [`CartEvent`]s. Writes run one at a time in that task; superseded updates
//! are dropped, never queued.
//!
//! Removal is not optimistic: the DELETE is followed by an unconditional
//! re-fetch so the list reconciles with the server whether or not the removal
//! succeeded.

use super::PendingUpdate;
use crate::api::models::CartItem;
use crate::api::{ApiClient, ApiError, ListQuery, Page};
use crate::debounce::Debouncer;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Cart endpoint path
pub const CART_PATH: &str = "/carts";

/// Carts are small; one page is fetched in full
const CART_PAGE_SIZE: usize = 100;

/// Server operations the cart needs
pub trait CartBackend: Send + Sync + 'static {
    fn fetch_cart(&self) -> impl Future<Output = Result<Vec<CartItem>, ApiError>> + Send;

    fn update_quantity(
        &self,
        cart_id: &str,
        quantity: u32,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn remove_item(&self, cart_id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl CartBackend for ApiClient {
    fn fetch_cart(&self) -> impl Future<Output = Result<Vec<CartItem>, ApiError>> + Send {
        async move {
            let page: Page<CartItem> = self
                .list(CART_PATH, &ListQuery::page(0, CART_PAGE_SIZE))
                .await?;
            Ok(page.items)
        }
    }

    fn update_quantity(
        &self,
        cart_id: &str,
        quantity: u32,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        let path = format!("{}/{}", CART_PATH, cart_id);
        async move {
            self.patch::<_, serde_json::Value>(&path, &serde_json::json!({ "quantity": quantity }))
                .await?;
            Ok(())
        }
    }

    fn remove_item(&self, cart_id: &str) -> impl Future<Output = Result<(), ApiError>> + Send {
        let path = format!("{}/{}", CART_PATH, cart_id);
        async move {
            self.delete(&path).await?;
            Ok(())
        }
    }
}

/// Progress reported by the cart's background tasks
#[derive(Debug, Clone, PartialEq)]
pub enum CartEvent {
    /// The writer picked up a settled edit
    Sending { cart_id: String, quantity: u32 },
    Synced { cart_id: String, quantity: u32 },
    SyncFailed {
        cart_id: String,
        quantity: u32,
        error: ApiError,
    },
    Removed { cart_id: String },
    RemoveFailed { cart_id: String, error: ApiError },
    Reloaded(Vec<CartItem>),
    ReloadFailed(ApiError),
}

/// Owns the debounce timer and writer task for one cart screen
pub struct CartSync<B> {
    backend: Arc<B>,
    debouncer: Debouncer<PendingUpdate>,
    events: mpsc::UnboundedSender<CartEvent>,
}

impl<B: CartBackend> CartSync<B> {
    /// Start the debouncer and writer. Events arrive on the returned receiver.
    pub fn spawn(backend: Arc<B>, delay: Duration) -> (Self, mpsc::UnboundedReceiver<CartEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (debouncer, settled) = Debouncer::spawn(delay);

        tokio::spawn(run_writer(backend.clone(), settled, events_tx.clone()));

        (
            Self {
                backend,
                debouncer,
                events: events_tx,
            },
            events_rx,
        )
    }

    /// Replace the outstanding write
    ///
    /// Returns the superseded update, which will never be sent.
    pub fn offer(&self, update: PendingUpdate) -> Option<PendingUpdate> {
        let superseded = self.debouncer.push(update);
        if let Some(old) = &superseded {
            tracing::trace!(cart_id = %old.cart_id, quantity = old.quantity, "Superseded cart write");
        }
        superseded
    }

    pub fn has_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Fetch the cart in the background
    pub fn reload(&self) {
        let backend = self.backend.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            reload_into(&*backend, &events).await;
        });
    }

    /// Remove a line, then re-fetch regardless of the outcome
    pub fn remove(&self, cart_id: &str) {
        // A pending write for the removed line is pointless; keep any other
        if let Some(pending) = self.debouncer.take_pending() {
            if pending.cart_id != cart_id {
                self.debouncer.push(pending);
            }
        }

        let backend = self.backend.clone();
        let events = self.events.clone();
        let cart_id = cart_id.to_string();
        tokio::spawn(async move {
            let event = match backend.remove_item(&cart_id).await {
                Ok(()) => {
                    tracing::info!(%cart_id, "Removed cart line");
                    CartEvent::Removed { cart_id }
                }
                Err(error) => {
                    tracing::warn!(%cart_id, %error, "Cart removal failed");
                    CartEvent::RemoveFailed { cart_id, error }
                }
            };
            if events.send(event).is_ok() {
                reload_into(&*backend, &events).await;
            }
        });
    }

    /// Stop the debounce timer; an unsent edit is discarded
    ///
    /// A write already handed to the server is allowed to finish.
    pub fn cancel(&self) {
        self.debouncer.cancel();
    }
}

async fn reload_into<B: CartBackend>(backend: &B, events: &mpsc::UnboundedSender<CartEvent>) {
    let event = match backend.fetch_cart().await {
        Ok(items) => CartEvent::Reloaded(items),
        Err(error) => {
            tracing::warn!(%error, "Cart fetch failed");
            CartEvent::ReloadFailed(error)
        }
    };
    let _ = events.send(event);
}

/// Performs settled writes one at a time until the debouncer goes away
async fn run_writer<B: CartBackend>(
    backend: Arc<B>,
    mut settled: mpsc::UnboundedReceiver<PendingUpdate>,
    events: mpsc::UnboundedSender<CartEvent>,
) {
    while let Some(update) = settled.recv().await {
        let PendingUpdate { cart_id, quantity } = update;
        if events
            .send(CartEvent::Sending {
                cart_id: cart_id.clone(),
                quantity,
            })
            .is_err()
        {
            return;
        }

        tracing::debug!(%cart_id, quantity, "Syncing cart quantity");
        let event = match backend.update_quantity(&cart_id, quantity).await {
            Ok(()) => CartEvent::Synced { cart_id, quantity },
            Err(error) => {
                tracing::warn!(%cart_id, %error, "Cart quantity sync failed");
                CartEvent::SyncFailed {
                    cart_id,
                    quantity,
                    error,
                }
            }
        };
        if events.send(event).is_err() {
            return;
        }
    }
    tracing::trace!("Cart writer stopped");
}

#[cfg(test)]
mod tests {
    use super::super::{CartState, LineState};
    use super::*;
    use crate::i18n::Locale;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::sleep;

    #[derive(Default)]
    struct FakeBackend {
        writes: Mutex<Vec<(String, u32)>>,
        fetches: AtomicUsize,
        removals: AtomicUsize,
        fail_writes: AtomicBool,
        fail_removals: AtomicBool,
        items: Mutex<Vec<CartItem>>,
    }

    impl FakeBackend {
        fn with_items(items: Vec<CartItem>) -> Arc<Self> {
            Arc::new(Self {
                items: Mutex::new(items),
                ..Default::default()
            })
        }

        fn writes(&self) -> Vec<(String, u32)> {
            self.writes.lock().unwrap().clone()
        }
    }

    impl CartBackend for FakeBackend {
        fn fetch_cart(&self) -> impl Future<Output = Result<Vec<CartItem>, ApiError>> + Send {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let items = self.items.lock().unwrap().clone();
            async move { Ok(items) }
        }

        fn update_quantity(
            &self,
            cart_id: &str,
            quantity: u32,
        ) -> impl Future<Output = Result<(), ApiError>> + Send {
            self.writes
                .lock()
                .unwrap()
                .push((cart_id.to_string(), quantity));
            let fail = self.fail_writes.load(Ordering::SeqCst);
            async move {
                if fail {
                    Err(ApiError::Status {
                        status: 400,
                        message: "Quantity exceeds stock".into(),
                    })
                } else {
                    Ok(())
                }
            }
        }

        fn remove_item(&self, _cart_id: &str) -> impl Future<Output = Result<(), ApiError>> + Send {
            self.removals.fetch_add(1, Ordering::SeqCst);
            let fail = self.fail_removals.load(Ordering::SeqCst);
            async move {
                if fail {
                    Err(ApiError::Transport("connection reset".into()))
                } else {
                    Ok(())
                }
            }
        }
    }

    fn item(id: &str, quantity: u32, remaining: u32) -> CartItem {
        CartItem {
            id: id.into(),
            product_id: format!("p-{}", id),
            product_name: id.to_uppercase(),
            quantity,
            remaining_quantity: remaining,
            selling_price: 1_000.0,
            images: Vec::new(),
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<CartEvent>) -> Vec<CartEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_steps_sends_one_write() {
        let backend = FakeBackend::with_items(vec![item("a", 1, 10)]);
        let (sync, mut events) = CartSync::spawn(backend.clone(), Duration::from_millis(500));
        let mut state = CartState::new();
        state.replace(backend.items.lock().unwrap().clone());

        for _ in 0..4 {
            let update = state.increment("a").unwrap();
            sync.offer(update);
            sleep(Duration::from_millis(50)).await;
        }
        assert_eq!(state.line("a").unwrap().quantity, 5);
        assert!(backend.writes().is_empty());

        sleep(Duration::from_millis(600)).await;
        assert_eq!(backend.writes(), vec![("a".to_string(), 5)]);

        let labels = Locale::En.labels();
        for event in drain(&mut events) {
            assert_eq!(state.apply(event, labels), None);
        }
        assert_eq!(state.line("a").unwrap().state, LineState::Stable);
    }

    #[tokio::test(start_paused = true)]
    async fn separate_settled_edits_each_write_once() {
        let backend = FakeBackend::with_items(Vec::new());
        let (sync, mut events) = CartSync::spawn(backend.clone(), Duration::from_millis(500));

        sync.offer(PendingUpdate {
            cart_id: "a".into(),
            quantity: 2,
        });
        sleep(Duration::from_millis(700)).await;
        sync.offer(PendingUpdate {
            cart_id: "a".into(),
            quantity: 3,
        });
        sleep(Duration::from_millis(700)).await;

        assert_eq!(
            backend.writes(),
            vec![("a".to_string(), 2), ("a".to_string(), 3)]
        );
        let events = drain(&mut events);
        assert_eq!(
            events,
            vec![
                CartEvent::Sending {
                    cart_id: "a".into(),
                    quantity: 2
                },
                CartEvent::Synced {
                    cart_id: "a".into(),
                    quantity: 2
                },
                CartEvent::Sending {
                    cart_id: "a".into(),
                    quantity: 3
                },
                CartEvent::Synced {
                    cart_id: "a".into(),
                    quantity: 3
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn edit_on_another_line_supersedes_pending_write() {
        let backend = FakeBackend::with_items(Vec::new());
        let (sync, _events) = CartSync::spawn(backend.clone(), Duration::from_millis(500));

        sync.offer(PendingUpdate {
            cart_id: "a".into(),
            quantity: 2,
        });
        let superseded = sync.offer(PendingUpdate {
            cart_id: "b".into(),
            quantity: 4,
        });
        assert_eq!(superseded.map(|u| u.cart_id), Some("a".to_string()));

        sleep(Duration::from_millis(600)).await;
        assert_eq!(backend.writes(), vec![("b".to_string(), 4)]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_sync_reports_one_notice_without_retry() {
        let backend = FakeBackend::with_items(vec![item("a", 1, 10)]);
        backend.fail_writes.store(true, Ordering::SeqCst);
        let (sync, mut events) = CartSync::spawn(backend.clone(), Duration::from_millis(500));
        let mut state = CartState::new();
        state.replace(backend.items.lock().unwrap().clone());

        sync.offer(state.increment("a").unwrap());
        sleep(Duration::from_secs(3)).await;

        let labels = Locale::En.labels();
        let notices: Vec<_> = drain(&mut events)
            .into_iter()
            .filter_map(|e| state.apply(e, labels))
            .collect();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "Failed to update quantity: Quantity exceeds stock");
        assert_eq!(backend.writes().len(), 1);
        // No rollback
        assert_eq!(state.line("a").unwrap().quantity, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_removal_refetches_once_with_one_error() {
        let backend = FakeBackend::with_items(vec![item("a", 1, 10), item("b", 2, 10)]);
        backend.fail_removals.store(true, Ordering::SeqCst);
        let (sync, mut events) = CartSync::spawn(backend.clone(), Duration::from_millis(500));
        let mut state = CartState::new();
        state.replace(backend.items.lock().unwrap().clone());

        sync.remove("a");
        sleep(Duration::from_millis(100)).await;

        assert_eq!(backend.removals.load(Ordering::SeqCst), 1);
        assert_eq!(backend.fetches.load(Ordering::SeqCst), 1);

        let labels = Locale::En.labels();
        let notices: Vec<_> = drain(&mut events)
            .into_iter()
            .filter_map(|e| state.apply(e, labels))
            .collect();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].is_error());
        assert_eq!(state.lines().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn successful_removal_also_refetches() {
        let backend = FakeBackend::with_items(vec![item("b", 2, 10)]);
        let (sync, mut events) = CartSync::spawn(backend.clone(), Duration::from_millis(500));

        sync.remove("a");
        sleep(Duration::from_millis(100)).await;

        assert_eq!(backend.fetches.load(Ordering::SeqCst), 1);
        let events = drain(&mut events);
        assert_eq!(events[0], CartEvent::Removed { cart_id: "a".into() });
        assert!(matches!(&events[1], CartEvent::Reloaded(items) if items.len() == 1));
    }

    #[tokio::test(start_paused = true)]
    async fn removing_a_line_drops_its_pending_write() {
        let backend = FakeBackend::with_items(Vec::new());
        let (sync, _events) = CartSync::spawn(backend.clone(), Duration::from_millis(500));

        sync.offer(PendingUpdate {
            cart_id: "a".into(),
            quantity: 3,
        });
        sync.remove("a");
        assert!(!sync.has_pending());

        sleep(Duration::from_secs(1)).await;
        assert!(backend.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_unsent_edit() {
        let backend = FakeBackend::with_items(Vec::new());
        let (sync, _events) = CartSync::spawn(backend.clone(), Duration::from_millis(500));

        sync.offer(PendingUpdate {
            cart_id: "a".into(),
            quantity: 3,
        });
        sleep(Duration::from_millis(200)).await;
        sync.cancel();

        sleep(Duration::from_secs(1)).await;
        assert!(backend.writes().is_empty());
    }
}
