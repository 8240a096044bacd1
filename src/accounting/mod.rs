//! Pluggable acquired-lot selection strategies (FIFO/LIFO/HIFO/LOFO and a
//! specific-ID pin-with-fallback variant), and the engine that drives them
//! against an AVL-indexed vector of acquisition lots.
pub mod candidates;
pub mod engine;
pub mod fifo;
pub mod hifo;
pub mod lifo;
pub mod lofo;
pub mod specific_id;

pub use candidates::Candidates;
pub use engine::AccountingEngine;
pub use fifo::Fifo;
pub use hifo::Hifo;
pub use lifo::Lifo;
pub use lofo::Lofo;
pub use specific_id::SpecificId;

use crate::decimal::Decimal;
use crate::model::transaction::InTransaction;

/// Declares which direction [`Candidates`] hands out lots when a method
/// doesn't maintain its own cursor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LotOrder {
    OlderToNewer,
    NewerToOlder,
}

/// A pluggable strategy for choosing which acquired lot covers a taxable
/// disposal. Implementations are expected to be cheap to construct (one
/// per asset, per run) and may hold interior-mutable cursors (see
/// [`Fifo`]'s `from_index`).
pub trait AccountingMethod {
    /// The non-exhausted lot (and the crypto amount still available in it)
    /// this method picks next, or `None` if every candidate lot is
    /// exhausted.
    ///
    /// `event_id` identifies the taxable event being matched; only the
    /// specific-ID method consults it, to honor a caller-supplied pin.
    fn seek_non_exhausted_acquired_lot<'a>(
        &self,
        candidates: &Candidates<'a>,
        event_id: u64,
    ) -> Option<(&'a InTransaction, Decimal)>;

    fn lot_candidates_order(&self) -> LotOrder;

    /// Whether the gain/loss set's ancestor-timestamp monotonicity check
    /// applies to chains this method produces. `true` for methods that
    /// only ever walk lots in chronological order.
    fn validates_lot_ancestry(&self) -> bool;

    fn name(&self) -> &'static str;
}
