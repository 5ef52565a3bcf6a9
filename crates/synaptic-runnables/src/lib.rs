mod lambda;
mod pipeline;
mod runnable;

pub use lambda::RunnableLambda;
pub use pipeline::Pipeline;
pub use runnable::{BoxRunnable, Runnable};
