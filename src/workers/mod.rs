pub mod post_expiry;

pub use post_expiry::PostExpiryWorker;
