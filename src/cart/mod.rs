// Cart subsystem
//
// Quantity edits are optimistic: the displayed quantity changes immediately
// and a `PendingUpdate` is handed to the debounced writer in `sync`. Each line
// moves through Stable → LocallyEdited → PendingSync → Stable.
//
// The displayed quantity is always within [1, remaining_quantity]. Steps past
// either bound are no-ops and produce no pending update.

pub mod sync;

pub use sync::{CartBackend, CartEvent, CartSync};

use crate::api::models::CartItem;
use crate::i18n::Labels;
use crate::notify::Notice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineState {
    #[default]
    Stable,
    /// Changed locally; waiting for the quiet period
    LocallyEdited,
    /// Write handed to the server
    PendingSync,
}

/// The single outstanding quantity write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpdate {
    pub cart_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub cart_id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub remaining_quantity: u32,
    pub selling_price: f64,
    pub state: LineState,
    /// Direct-entry buffer while the quantity field is being typed into
    pub draft: Option<String>,
}

impl CartLine {
    fn from_item(item: CartItem) -> Self {
        let mut line = Self {
            cart_id: item.id,
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            remaining_quantity: item.remaining_quantity,
            selling_price: item.selling_price,
            state: LineState::Stable,
            draft: None,
        };
        line.quantity = line.clamp(line.quantity);
        line
    }

    /// Upper bound for the displayed quantity; never below 1
    pub fn max_quantity(&self) -> u32 {
        self.remaining_quantity.max(1)
    }

    fn clamp(&self, quantity: u32) -> u32 {
        quantity.clamp(1, self.max_quantity())
    }

    pub fn line_total(&self) -> f64 {
        self.selling_price * f64::from(self.quantity)
    }

    fn edit(&mut self, quantity: u32) -> PendingUpdate {
        self.quantity = quantity;
        self.state = LineState::LocallyEdited;
        PendingUpdate {
            cart_id: self.cart_id.clone(),
            quantity,
        }
    }
}

/// Client-side view of the signed-in customer's cart
#[derive(Debug, Clone, Default)]
pub struct CartState {
    lines: Vec<CartLine>,
    loading: bool,
    loaded: bool,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, cart_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.cart_id == cart_id)
    }

    fn line_mut(&mut self, cart_id: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.cart_id == cart_id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Whether at least one fetch has completed
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn total(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Replace lines wholesale with a fresh server fetch
    ///
    /// Lines with an unsent local edit keep their displayed quantity (re-clamped
    /// against the new stock) so a reload does not undo the user's typing.
    pub fn replace(&mut self, items: Vec<CartItem>) {
        let previous = std::mem::take(&mut self.lines);
        self.lines = items
            .into_iter()
            .map(|item| {
                let mut line = CartLine::from_item(item);
                if let Some(old) = previous
                    .iter()
                    .find(|o| o.cart_id == line.cart_id && o.state != LineState::Stable)
                {
                    line.quantity = line.clamp(old.quantity);
                    line.state = old.state;
                }
                line
            })
            .collect();
        self.loading = false;
        self.loaded = true;
    }

    /// +1, unless already at the stock limit
    pub fn increment(&mut self, cart_id: &str) -> Option<PendingUpdate> {
        let line = self.line_mut(cart_id)?;
        if line.quantity >= line.max_quantity() {
            return None;
        }
        line.draft = None;
        let next = line.quantity + 1;
        Some(line.edit(next))
    }

    /// -1, unless already at 1
    pub fn decrement(&mut self, cart_id: &str) -> Option<PendingUpdate> {
        let line = self.line_mut(cart_id)?;
        if line.quantity <= 1 {
            return None;
        }
        line.draft = None;
        let next = line.quantity - 1;
        Some(line.edit(next))
    }

    /// Update the direct-entry buffer
    ///
    /// Returns false (buffer unchanged) when the text is not a number in
    /// `[1, remaining_quantity]`. An empty buffer is accepted so the field can
    /// be cleared before typing a new value.
    pub fn type_quantity(&mut self, cart_id: &str, text: &str) -> bool {
        let Some(line) = self.line_mut(cart_id) else {
            return false;
        };
        let text = text.trim();
        if !text.is_empty() {
            match text.parse::<u32>() {
                Ok(n) if (1..=line.max_quantity()).contains(&n) => {}
                _ => return false,
            }
        }
        line.draft = Some(text.to_string());
        true
    }

    pub fn draft(&self, cart_id: &str) -> Option<&str> {
        self.line(cart_id)?.draft.as_deref()
    }

    /// Leave the quantity field: clamp the buffer and edit if it changed
    pub fn commit_quantity(&mut self, cart_id: &str) -> Option<PendingUpdate> {
        let line = self.line_mut(cart_id)?;
        let draft = line.draft.take()?;
        let wanted = line.clamp(draft.parse::<u32>().unwrap_or(1));
        (wanted != line.quantity).then(|| line.edit(wanted))
    }

    /// The debounced writer has picked up a write of `quantity`
    ///
    /// A line edited again since then stays LocallyEdited.
    pub fn mark_pending(&mut self, cart_id: &str, quantity: u32) {
        if let Some(line) = self.line_mut(cart_id) {
            if line.quantity == quantity {
                line.state = LineState::PendingSync;
            }
        }
    }

    /// Back to Stable once the write of `quantity` is finished or dropped
    ///
    /// Only applies while the line still displays that quantity; a newer
    /// local edit keeps the line LocallyEdited until its own write settles.
    pub fn settle(&mut self, cart_id: &str, quantity: u32) {
        if let Some(line) = self.line_mut(cart_id) {
            if line.quantity == quantity {
                line.state = LineState::Stable;
            }
        }
    }

    /// Fold a sync event into the state; returns the notice to show, if any
    ///
    /// A failed write leaves the optimistic quantity in place; there is no
    /// rollback and no retry.
    pub fn apply(&mut self, event: CartEvent, labels: &Labels) -> Option<Notice> {
        match event {
            CartEvent::Sending { cart_id, quantity } => {
                self.mark_pending(&cart_id, quantity);
                None
            }
            CartEvent::Synced { cart_id, quantity } => {
                self.settle(&cart_id, quantity);
                None
            }
            CartEvent::SyncFailed {
                cart_id,
                quantity,
                error,
            } => {
                self.settle(&cart_id, quantity);
                Some(Notice::from_api_error(&error, labels.cart_sync_failed, labels))
            }
            CartEvent::Removed { .. } => Some(Notice::success(labels.cart_removed)),
            CartEvent::RemoveFailed { error, .. } => Some(Notice::from_api_error(
                &error,
                labels.cart_remove_failed,
                labels,
            )),
            CartEvent::Reloaded(items) => {
                self.replace(items);
                None
            }
            CartEvent::ReloadFailed(error) => {
                self.loading = false;
                Some(Notice::from_api_error(&error, labels.load_failed, labels))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::i18n::Locale;

    fn item(id: &str, quantity: u32, remaining: u32) -> CartItem {
        CartItem {
            id: id.into(),
            product_id: format!("p-{}", id),
            product_name: format!("Product {}", id),
            quantity,
            remaining_quantity: remaining,
            selling_price: 10_000.0,
            images: Vec::new(),
        }
    }

    fn cart(items: Vec<CartItem>) -> CartState {
        let mut state = CartState::new();
        state.replace(items);
        state
    }

    #[test]
    fn increment_at_stock_limit_is_noop() {
        let mut state = cart(vec![item("a", 3, 3)]);
        assert_eq!(state.increment("a"), None);
        assert_eq!(state.line("a").unwrap().quantity, 3);
        assert_eq!(state.line("a").unwrap().state, LineState::Stable);
    }

    #[test]
    fn decrement_at_one_is_noop() {
        let mut state = cart(vec![item("a", 1, 5)]);
        assert_eq!(state.decrement("a"), None);
        assert_eq!(state.line("a").unwrap().quantity, 1);
    }

    #[test]
    fn steps_update_display_immediately() {
        let mut state = cart(vec![item("a", 2, 5)]);
        let update = state.increment("a").unwrap();
        assert_eq!(
            update,
            PendingUpdate {
                cart_id: "a".into(),
                quantity: 3
            }
        );
        let line = state.line("a").unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.state, LineState::LocallyEdited);
        assert_eq!(state.decrement("a").unwrap().quantity, 2);
    }

    #[test]
    fn server_quantities_are_clamped_for_display() {
        let state = cart(vec![item("a", 9, 4), item("b", 0, 4), item("c", 2, 0)]);
        assert_eq!(state.line("a").unwrap().quantity, 4);
        assert_eq!(state.line("b").unwrap().quantity, 1);
        assert_eq!(state.line("c").unwrap().quantity, 1);
    }

    #[test]
    fn typing_rejects_out_of_range_input() {
        let mut state = cart(vec![item("a", 2, 5)]);
        assert!(state.type_quantity("a", "4"));
        assert!(!state.type_quantity("a", "6"));
        assert!(!state.type_quantity("a", "0"));
        assert!(!state.type_quantity("a", "x"));
        assert_eq!(state.draft("a"), Some("4"));
        assert!(state.type_quantity("a", ""));
        assert_eq!(state.draft("a"), Some(""));
    }

    #[test]
    fn commit_clamps_and_skips_unchanged() {
        let mut state = cart(vec![item("a", 2, 5)]);
        state.type_quantity("a", "5");
        assert_eq!(state.commit_quantity("a").unwrap().quantity, 5);

        state.type_quantity("a", "");
        assert_eq!(state.commit_quantity("a").unwrap().quantity, 1);

        state.type_quantity("a", "1");
        assert_eq!(state.commit_quantity("a"), None);
        assert_eq!(state.commit_quantity("a"), None);
    }

    #[test]
    fn quantity_stays_in_bounds_under_any_sequence() {
        let mut state = cart(vec![item("a", 1, 4)]);
        for step in 0..40 {
            match step % 5 {
                0 | 1 | 2 => {
                    state.increment("a");
                }
                3 => {
                    state.decrement("a");
                }
                _ => {
                    state.type_quantity("a", &(step % 7).to_string());
                    state.commit_quantity("a");
                }
            }
            let q = state.line("a").unwrap().quantity;
            assert!((1..=4).contains(&q), "quantity {} out of range", q);
        }
    }

    #[test]
    fn lifecycle_through_events() {
        let labels = Locale::En.labels();
        let mut state = cart(vec![item("a", 1, 5)]);
        state.increment("a");
        assert_eq!(state.line("a").unwrap().state, LineState::LocallyEdited);

        let sending = CartEvent::Sending {
            cart_id: "a".into(),
            quantity: 2,
        };
        state.apply(sending, labels);
        assert_eq!(state.line("a").unwrap().state, LineState::PendingSync);

        let synced = CartEvent::Synced {
            cart_id: "a".into(),
            quantity: 2,
        };
        assert_eq!(state.apply(synced, labels), None);
        assert_eq!(state.line("a").unwrap().state, LineState::Stable);
    }

    #[test]
    fn late_confirmation_keeps_newer_edit_through_reload() {
        let labels = Locale::En.labels();
        let mut state = cart(vec![item("a", 2, 5), item("b", 1, 5)]);
        state.increment("a");
        state.apply(
            CartEvent::Sending {
                cart_id: "a".into(),
                quantity: 3,
            },
            labels,
        );
        state.increment("a");
        state.apply(
            CartEvent::Synced {
                cart_id: "a".into(),
                quantity: 3,
            },
            labels,
        );
        assert_eq!(state.line("a").unwrap().state, LineState::LocallyEdited);

        // Re-fetch after removing another line sees the server at 3
        state.replace(vec![item("a", 3, 5)]);
        assert_eq!(state.line("a").unwrap().quantity, 4);
        assert_eq!(state.line("a").unwrap().state, LineState::LocallyEdited);

        state.apply(
            CartEvent::Sending {
                cart_id: "a".into(),
                quantity: 4,
            },
            labels,
        );
        assert_eq!(state.line("a").unwrap().state, LineState::PendingSync);
    }

    #[test]
    fn stale_sending_does_not_mark_pending() {
        let labels = Locale::En.labels();
        let mut state = cart(vec![item("a", 1, 5)]);
        state.increment("a");
        state.increment("a");
        state.apply(
            CartEvent::Sending {
                cart_id: "a".into(),
                quantity: 2,
            },
            labels,
        );
        assert_eq!(state.line("a").unwrap().state, LineState::LocallyEdited);
    }

    #[test]
    fn failed_sync_keeps_optimistic_quantity() {
        let labels = Locale::En.labels();
        let mut state = cart(vec![item("a", 1, 5)]);
        state.increment("a");
        let notice = state
            .apply(
                CartEvent::SyncFailed {
                    cart_id: "a".into(),
                    quantity: 2,
                    error: ApiError::Transport("reset".into()),
                },
                labels,
            )
            .unwrap();
        assert!(notice.is_error());
        assert_eq!(state.line("a").unwrap().quantity, 2);
        assert_eq!(state.line("a").unwrap().state, LineState::Stable);
    }

    #[test]
    fn reload_preserves_unsent_edits() {
        let mut state = cart(vec![item("a", 1, 5), item("b", 1, 5)]);
        state.increment("a");
        state.increment("a");
        state.replace(vec![item("a", 1, 2), item("b", 4, 5)]);
        assert_eq!(state.line("a").unwrap().quantity, 2);
        assert_eq!(state.line("b").unwrap().quantity, 4);
    }

    #[test]
    fn total_sums_lines() {
        let state = cart(vec![item("a", 2, 5), item("b", 3, 5)]);
        assert_eq!(state.total(), 50_000.0);
    }
}
