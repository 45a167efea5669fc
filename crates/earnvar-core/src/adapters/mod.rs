pub mod nasdaq;

pub use nasdaq::NasdaqSource;
