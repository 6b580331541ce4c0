pub(crate) mod health;
pub mod scan;

pub use health::health_check;
