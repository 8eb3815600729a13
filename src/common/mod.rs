pub mod account_fetcher;
pub mod happypump;
pub mod metadata;
pub mod subscription_handle;
pub mod types;

pub use account_fetcher::*;
pub use subscription_handle::SubscriptionHandle;
pub use types::*;
