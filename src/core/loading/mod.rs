pub mod gate;
pub mod promise;
pub mod state;

pub use gate::{publish_if_changed, EqualityGate, Projection};
pub use promise::{producer, ErrorFallback, Producer, PromiseAdapter, SettlePolicy};
pub use state::{IntoResultState, ResultState};
