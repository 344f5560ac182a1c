mod traits;
mod options;
mod pollinations;
pub mod retry;

pub use traits::*;
pub use options::{available_models, model_display_name, CompletionOptions};
pub use pollinations::PollinationsClient;
pub use retry::RetryPolicy;
