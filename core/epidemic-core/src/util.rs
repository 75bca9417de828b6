pub mod random;

/// Batch removal: decide on every element exactly once, then split off the
/// selected ones. The remainder keeps its order.
pub trait DrainWhere<T> {
    fn drain_where<F: FnMut(&T) -> bool>(&mut self, pred: F) -> Vec<T>;
}

impl<T> DrainWhere<T> for Vec<T> {
    fn drain_where<F: FnMut(&T) -> bool>(&mut self, pred: F) -> Vec<T> {
        let (selected, keep): (Vec<T>, Vec<T>) = std::mem::take(self).into_iter().partition(pred);
        *self = keep;
        selected
    }
}
