use async_trait::async_trait;

/// One unit of periodic work driven by [`crate::RefreshLoop`].
///
/// `Input` is read once at the start of every cycle, `Output` replaces the
/// previously published value as a whole.
#[async_trait]
pub trait CycleWorker: Send + Sync + 'static {
    type Input: Clone + Send + Sync + 'static;
    type Output: Send + Sync + 'static;

    /// `false` stops the loop before any request is made.
    fn has_work(&self, input: &Self::Input) -> bool;

    async fn cycle(&self, input: Self::Input) -> Self::Output;
}
