//! Loader Module
//!
//! The application-supplied origin a group falls back to on a miss.

use async_trait::async_trait;

// == Loader ==
/// Loads the value for a key from the origin data source.
///
/// Called on cache misses, possibly more than once for the same key, so it
/// must be safe to repeat.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

// == Loader Fn ==
/// Adapts a synchronous closure into a [`Loader`].
///
/// # Example
/// ```ignore
/// let loader = LoaderFn::new(|key: &str| Ok(key.as_bytes().to_vec()));
/// ```
pub struct LoaderFn<F> {
    f: F,
}

impl<F> LoaderFn<F>
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> Loader for LoaderFn<F>
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        (self.f)(key)
    }
}
