//! The downstream grouping stage.
//!
//! Grouping consumes the ordered output of a view. How it builds its groups
//! is up to the implementation; the coordinator only decides which entry
//! point to call.

use hashbrown::HashMap;
use vista_core::RecordId;

/// Receives the ordered output of every recompute.
pub trait GroupStage {
    /// Called when the set of records in the view may have changed.
    fn group(&mut self, images: &[RecordId], order: &HashMap<RecordId, usize>);

    /// Called when only the order changed; the records are the ones passed
    /// to the last [`group`](Self::group) call.
    fn sort(&mut self, order: &HashMap<RecordId, usize>);
}

/// A stage that ignores its input, for views without grouping.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoGrouping;

impl GroupStage for NoGrouping {
    fn group(&mut self, _images: &[RecordId], _order: &HashMap<RecordId, usize>) {}

    fn sort(&mut self, _order: &HashMap<RecordId, usize>) {}
}
