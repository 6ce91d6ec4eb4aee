//! Cart store
//!
//! Owns the single cart aggregate: every operation loads the persisted
//! cart, applies one mutation, recomputes the derived totals and persists
//! the result, returning the updated snapshot for the caller to render.
//!
//! Operations never fail from the caller's perspective. An unreadable or
//! corrupt slot is silently replaced with an empty cart, and a failed write
//! leaves the returned in-memory state authoritative until the next
//! successful persist. Failed writes are logged and surfaced through
//! [`CartStore::take_write_error`] for hosts that want to observe them.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, warn};

use crate::{
    cart::{Cart, CartLine},
    merchandise::{ProductSummary, Variant},
    money::Money,
    slot::{DurableSlot, SlotError},
};

/// Storage key under which the cart is persisted.
pub const CART_STORAGE_KEY: &str = "aragon-commerce-cart";

/// A one-step quantity adjustment applied to an existing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAdjustment {
    /// Raise the quantity by one.
    Increment,
    /// Lower the quantity by one; reaching zero removes the line.
    Decrement,
    /// Remove the line outright.
    Remove,
}

#[derive(Debug, Default)]
struct StoreState {
    last_write_error: Option<SlotError>,
}

/// The cart store: a durable slot plus the storage key, with each
/// load-mutate-persist cycle serialized under one lock.
///
/// The original storefront assumed a single writer and offered no guard;
/// the lock covers hosts with real in-process concurrency. Writers in other
/// processes remain last-write-wins.
#[derive(Debug)]
pub struct CartStore<S> {
    slot: S,
    key: String,
    state: Mutex<StoreState>,
}

impl<S: DurableSlot> CartStore<S> {
    /// Creates a store persisting under [`CART_STORAGE_KEY`].
    pub fn new(slot: S) -> Self {
        CartStore::with_key(slot, CART_STORAGE_KEY)
    }

    /// Creates a store persisting under a custom key.
    pub fn with_key(slot: S, key: impl Into<String>) -> Self {
        CartStore {
            slot,
            key: key.into(),
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Loads the current cart.
    ///
    /// A missing, unreadable or corrupt slot yields the canonical empty
    /// cart; recovery is logged, never surfaced.
    pub fn load(&self) -> Cart {
        let _state = self.lock();

        self.read_cart()
    }

    /// Adds a variant to the cart.
    ///
    /// An existing line for the same merchandise id absorbs the quantity
    /// and has its running total re-derived from the variant's current
    /// price; otherwise a new line is appended with a fresh id.
    pub fn add_line(
        &self,
        merchandise_id: &str,
        quantity: u32,
        product: ProductSummary,
        variant: Variant,
    ) -> Cart {
        let mut state = self.lock();
        let mut cart = self.read_cart();

        if let Some(line) = cart.line_mut(merchandise_id) {
            line.quantity += quantity;
            line.cost.total_amount = variant.price.times(line.quantity);
        } else {
            cart.lines
                .push(CartLine::new(merchandise_id, quantity, product, variant));
        }

        cart.recompute_totals();
        self.persist(&mut state, &cart);

        cart
    }

    /// Sets the quantity of an existing line, re-deriving its running total
    /// from the supplied unit price. Quantity 0 removes the line.
    ///
    /// An unknown merchandise id is an idempotent no-op: the freshly loaded
    /// cart is recomputed, re-persisted and returned unchanged.
    pub fn update_line_quantity(
        &self,
        merchandise_id: &str,
        new_quantity: u32,
        unit_price: &Money,
    ) -> Cart {
        let mut state = self.lock();
        let mut cart = self.read_cart();

        apply_quantity(&mut cart, merchandise_id, new_quantity, unit_price);

        cart.recompute_totals();
        self.persist(&mut state, &cart);

        cart
    }

    /// Steps an existing line's quantity up or down by one, or removes it.
    ///
    /// The unit price is reconstructed from the line's running total
    /// divided by its previous quantity, rounded to 2 decimal places. An
    /// unknown merchandise id returns the freshly loaded cart untouched.
    pub fn adjust_line(&self, merchandise_id: &str, adjustment: LineAdjustment) -> Cart {
        let mut state = self.lock();
        let mut cart = self.read_cart();

        let step = cart.line(merchandise_id).map(|line| {
            let new_quantity = match adjustment {
                LineAdjustment::Increment => line.quantity.saturating_add(1),
                LineAdjustment::Decrement => line.quantity.saturating_sub(1),
                LineAdjustment::Remove => 0,
            };

            (new_quantity, line.cost.total_amount.unit_price(line.quantity))
        });

        let Some((new_quantity, unit_price)) = step else {
            return cart;
        };

        apply_quantity(&mut cart, merchandise_id, new_quantity, &unit_price);

        cart.recompute_totals();
        self.persist(&mut state, &cart);

        cart
    }

    /// Removes the line for the given merchandise id, if present.
    pub fn remove_line(&self, merchandise_id: &str) -> Cart {
        let mut state = self.lock();
        let mut cart = self.read_cart();

        cart.lines.retain(|line| line.merchandise.id != merchandise_id);

        cart.recompute_totals();
        self.persist(&mut state, &cart);

        cart
    }

    /// Replaces the persisted cart with the canonical empty cart.
    pub fn clear(&self) -> Cart {
        let mut state = self.lock();
        let cart = Cart::empty();

        self.persist(&mut state, &cart);

        cart
    }

    /// Takes the most recent swallowed write failure, if any.
    ///
    /// Public operations never fail; a host that wants stricter durability
    /// can poll this after a mutation.
    pub fn take_write_error(&self) -> Option<SlotError> {
        self.lock().last_write_error.take()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_cart(&self) -> Cart {
        let raw = match self.slot.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Cart::empty(),
            Err(error) => {
                warn!(key = %self.key, %error, "failed to read cart slot, starting empty");
                return Cart::empty();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(cart) => cart,
            Err(error) => {
                warn!(key = %self.key, %error, "persisted cart is corrupt, starting empty");
                Cart::empty()
            }
        }
    }

    fn persist(&self, state: &mut StoreState, cart: &Cart) {
        let payload = match serde_json::to_string(cart) {
            Ok(payload) => payload,
            Err(error) => {
                error!(key = %self.key, %error, "failed to serialize cart");
                return;
            }
        };

        match self.slot.write(&self.key, &payload) {
            Ok(()) => {
                state.last_write_error = None;
                debug!(key = %self.key, total_quantity = cart.total_quantity, "cart persisted");
            }
            Err(error) => {
                error!(key = %self.key, %error, "failed to persist cart, keeping in-memory state");
                state.last_write_error = Some(error);
            }
        }
    }
}

fn apply_quantity(cart: &mut Cart, merchandise_id: &str, new_quantity: u32, unit_price: &Money) {
    if new_quantity == 0 {
        cart.lines.retain(|line| line.merchandise.id != merchandise_id);
    } else if let Some(line) = cart.line_mut(merchandise_id) {
        line.quantity = new_quantity;
        line.cost.total_amount = unit_price.times(new_quantity);
    }
}
