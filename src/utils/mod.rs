pub mod cancellation;

pub use cancellation::CancellationSignal;
