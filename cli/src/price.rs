//! Reward token price cache
//!
//! Owned by whoever displays values; refreshed explicitly and tagged with the
//! time it was last refreshed so stale prices are never shown silently.

use reward_model::fixed::saturating_mul_truncate;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::snapshot::Amount;

#[derive(Debug, Error)]
pub enum PriceError {
    #[error("failed to read price file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse price file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Price quote (scaled USD per reward token)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Price {
    pub symbol: String,
    pub usd: u128,
}

pub trait PriceSource {
    fn fetch(&self) -> Result<Price, PriceError>;
}

#[derive(Deserialize)]
struct PriceFile {
    symbol: String,
    usd: Amount,
}

/// `{ "symbol": "MTA", "usd": "0.42" }` on disk
#[derive(Debug, Clone)]
pub struct FilePriceSource {
    path: PathBuf,
}

impl FilePriceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PriceSource for FilePriceSource {
    fn fetch(&self) -> Result<Price, PriceError> {
        let data = fs::read_to_string(&self.path).map_err(|source| PriceError::Read {
            path: self.path.clone(),
            source,
        })?;
        let file: PriceFile = serde_json::from_str(&data).map_err(|source| PriceError::Parse {
            path: self.path.clone(),
            source,
        })?;
        Ok(Price { symbol: file.symbol, usd: file.usd.0 })
    }
}

#[derive(Debug, Clone)]
pub struct PriceCache {
    max_age_secs: u64,
    price: Option<Price>,
    updated_at: Option<u64>,
}

impl PriceCache {
    pub fn new(max_age_secs: u64) -> Self {
        Self { max_age_secs, price: None, updated_at: None }
    }

    /// Replace the cached price; on failure the previous price is kept
    pub fn refresh(&mut self, source: &dyn PriceSource, now: u64) -> Result<(), PriceError> {
        let price = source.fetch()?;
        log::debug!("price refreshed: {} = {}", price.symbol, price.usd);
        self.price = Some(price);
        self.updated_at = Some(now);
        Ok(())
    }

    pub fn updated_at(&self) -> Option<u64> {
        self.updated_at
    }

    pub fn is_stale(&self, now: u64) -> bool {
        match self.updated_at {
            Some(t) => now.saturating_sub(t) > self.max_age_secs,
            None => true,
        }
    }

    /// Cached price if still fresh
    pub fn price(&self, now: u64) -> Option<&Price> {
        if self.is_stale(now) {
            None
        } else {
            self.price.as_ref()
        }
    }

    /// USD value (scaled) of a scaled token amount, if the price is fresh
    pub fn value_of(&self, amount: u128, now: u64) -> Option<u128> {
        self.price(now)
            .map(|p| saturating_mul_truncate(amount, p.usd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reward_model::fixed::{units, SCALE};
    use std::cell::Cell;

    struct Fake {
        usd: u128,
        fail: Cell<bool>,
    }

    impl PriceSource for Fake {
        fn fetch(&self) -> Result<Price, PriceError> {
            if self.fail.get() {
                return Err(PriceError::Read {
                    path: PathBuf::from("fake"),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "offline"),
                });
            }
            Ok(Price { symbol: "RWD".into(), usd: self.usd })
        }
    }

    #[test]
    fn test_empty_cache_is_stale() {
        let cache = PriceCache::new(60);
        assert!(cache.is_stale(0));
        assert_eq!(cache.value_of(units(1), 0), None);
    }

    #[test]
    fn test_refresh_and_expire() {
        let source = Fake { usd: SCALE / 2, fail: Cell::new(false) };
        let mut cache = PriceCache::new(60);

        cache.refresh(&source, 1_000).unwrap();
        assert_eq!(cache.updated_at(), Some(1_000));
        assert_eq!(cache.value_of(units(10), 1_030), Some(units(5)));

        // Past max age the value is withheld, not guessed
        assert_eq!(cache.value_of(units(10), 1_061), None);
    }

    #[test]
    fn test_failed_refresh_keeps_previous() {
        let source = Fake { usd: SCALE, fail: Cell::new(false) };
        let mut cache = PriceCache::new(60);
        cache.refresh(&source, 1_000).unwrap();

        source.fail.set(true);
        assert!(cache.refresh(&source, 1_010).is_err());
        assert_eq!(cache.updated_at(), Some(1_000));
        assert!(cache.price(1_010).is_some());
    }

    #[test]
    fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.json");
        fs::write(&path, r#"{ "symbol": "MTA", "usd": "0.42" }"#).unwrap();

        let price = FilePriceSource::new(&path).fetch().unwrap();
        assert_eq!(price.symbol, "MTA");
        assert_eq!(price.usd, 42 * SCALE / 100);
    }
}
