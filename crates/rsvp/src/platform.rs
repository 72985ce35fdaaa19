// Browser bindings (feature-gated)
#[cfg(feature = "browser")]
pub mod browser;
