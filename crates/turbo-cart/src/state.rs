//! Cart state and its transitions.
//!
//! Every transition is pure: it takes `&self` and returns the next state,
//! leaving the current one untouched. The store commits the returned value
//! only after it has been persisted.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CartError;
use crate::ids::ProductId;
use crate::line::{CartLine, ProductCandidate};

/// Ordered sequence of cart lines, at most one per product id.
///
/// Serialized as a bare JSON array of lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartState {
    lines: Vec<CartLine>,
}

/// What an operation did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A new line was appended with quantity 1.
    Added,
    /// An existing line's quantity went up; carries the new quantity.
    Incremented { quantity: u32 },
    /// An existing line's quantity went down; carries the new quantity.
    Decremented { quantity: u32 },
    /// A line at quantity 1 was decremented and removed.
    Removed,
    /// The id was not in the cart; nothing changed.
    Unchanged,
}

impl CartState {
    /// An empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from lines, rejecting anything that breaks the cart
    /// invariants.
    pub fn from_lines(lines: Vec<CartLine>) -> Result<Self, CartError> {
        let state = Self { lines };
        state.validate()?;
        Ok(state)
    }

    /// Lines in cart order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Get a line by product id.
    pub fn get(&self, id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.id == id)
    }

    /// Check if a product is in the cart.
    pub fn contains(&self, id: &ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Check the cart invariants: valid lines, positive quantities, unique ids.
    pub fn validate(&self) -> Result<(), CartError> {
        let mut seen = HashSet::with_capacity(self.lines.len());
        for line in &self.lines {
            line.validate()?;
            if !seen.insert(&line.id) {
                return Err(CartError::InvalidArgument(format!(
                    "duplicate line for product {}",
                    line.id
                )));
            }
        }
        Ok(())
    }

    /// Add a product.
    ///
    /// A product already in the cart is incremented instead, and the
    /// candidate's title, image and price are discarded in favor of the
    /// existing line's. A new product is appended with quantity 1.
    pub fn with_added(&self, candidate: ProductCandidate) -> Result<(Self, Transition), CartError> {
        candidate.validate()?;

        if self.contains(&candidate.id) {
            return self.with_incremented(&candidate.id);
        }

        let mut lines = self.lines.clone();
        lines.push(CartLine::from_candidate(candidate));
        Ok((Self { lines }, Transition::Added))
    }

    /// Increase a line's quantity by one. Unknown ids leave the cart unchanged.
    pub fn with_incremented(&self, id: &ProductId) -> Result<(Self, Transition), CartError> {
        id.validate()?;

        let Some(index) = self.position(id) else {
            return Ok((self.clone(), Transition::Unchanged));
        };

        let mut lines = self.lines.clone();
        let line = &mut lines[index];
        line.quantity = line
            .quantity
            .checked_add(1)
            .ok_or_else(|| CartError::QuantityOverflow(id.to_string()))?;
        let quantity = line.quantity;

        Ok((Self { lines }, Transition::Incremented { quantity }))
    }

    /// Decrease a line's quantity by one, removing it when it reaches zero.
    /// Unknown ids leave the cart unchanged.
    pub fn with_decremented(&self, id: &ProductId) -> Result<(Self, Transition), CartError> {
        id.validate()?;

        let Some(index) = self.position(id) else {
            return Ok((self.clone(), Transition::Unchanged));
        };

        let mut lines = self.lines.clone();
        if lines[index].quantity <= 1 {
            lines.remove(index);
            return Ok((Self { lines }, Transition::Removed));
        }

        let line = &mut lines[index];
        line.quantity -= 1;
        let quantity = line.quantity;
        Ok((Self { lines }, Transition::Decremented { quantity }))
    }

    fn position(&self, id: &ProductId) -> Option<usize> {
        self.lines.iter().position(|l| &l.id == id)
    }
}
