/// The application the replicated log drives.
///
/// `apply` is called exactly once per committed index, in strictly
/// increasing index order. Implementations are shared with the rest of the
/// node, so they take `&self` and handle their own interior mutability.
pub trait StateMachine: Send + Sync {
    fn apply(&self, payload: &[u8]);
}

impl<F> StateMachine for F
where
    F: Fn(&[u8]) + Send + Sync,
{
    fn apply(&self, payload: &[u8]) {
        self(payload)
    }
}
