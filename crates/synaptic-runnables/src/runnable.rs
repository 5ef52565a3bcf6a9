use async_trait::async_trait;
use synaptic_core::{RunnableConfig, SynapticError};

/// The core composition trait. Components, chains and pipelines all implement it.
///
/// Implementors only need to provide `invoke`. `batch` runs inputs one after
/// another and `boxed` erases the concrete type.
#[async_trait]
pub trait Runnable<I, O>: Send + Sync
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// Execute this runnable on a single input.
    async fn invoke(&self, input: I, config: &RunnableConfig) -> Result<O, SynapticError>;

    /// Execute this runnable on multiple inputs sequentially, keeping input order.
    async fn batch(&self, inputs: Vec<I>, config: &RunnableConfig) -> Vec<Result<O, SynapticError>> {
        let mut results = Vec::with_capacity(inputs.len());
        for input in inputs {
            results.push(self.invoke(input, config).await);
        }
        results
    }

    /// Wrap this runnable into a type-erased `BoxRunnable`.
    fn boxed(self) -> BoxRunnable<I, O>
    where
        Self: Sized + 'static,
    {
        BoxRunnable::new(self)
    }
}

/// A type-erased runnable, used to store heterogeneous components side by side.
pub struct BoxRunnable<I: Send + 'static, O: Send + 'static> {
    inner: Box<dyn Runnable<I, O>>,
}

impl<I: Send + 'static, O: Send + 'static> BoxRunnable<I, O> {
    pub fn new<R: Runnable<I, O> + 'static>(runnable: R) -> Self {
        Self {
            inner: Box::new(runnable),
        }
    }
}

#[async_trait]
impl<I: Send + 'static, O: Send + 'static> Runnable<I, O> for BoxRunnable<I, O> {
    async fn invoke(&self, input: I, config: &RunnableConfig) -> Result<O, SynapticError> {
        self.inner.invoke(input, config).await
    }

    async fn batch(&self, inputs: Vec<I>, config: &RunnableConfig) -> Vec<Result<O, SynapticError>> {
        self.inner.batch(inputs, config).await
    }
}
