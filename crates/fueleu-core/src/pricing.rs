//! Advisory fuel prices
//!
//! Prices never feed into the compliance math; they only annotate mitigation
//! plans with an indicative cost. A [`PriceBook`] answers from, in order:
//!
//! 1. a previously fetched price that is still inside the validity window
//! 2. a fresh fetch from the configured [`PriceFeed`]
//! 3. the static default table
//!
//! A failing or missing feed therefore degrades to labelled defaults and never
//! blocks a calculation.

use crate::fuel::names;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Where a quoted price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceOrigin {
    Live,
    Cached,
    /// Static fallback table, possibly out of date
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelPrice {
    /// unit: EUR/t
    pub eur_per_tonne: f64,
    pub origin: PriceOrigin,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PriceFeedError {
    #[error("Price data unavailable for {fuel}: {reason}")]
    Unavailable { fuel: String, reason: String },
    #[error("Price for {fuel} is not a usable number: {value}")]
    InvalidPrice { fuel: String, value: f64 },
}

/// Source of live prices, typically backed by an external market data service.
pub trait PriceFeed {
    fn fetch(&self, fuel: &str) -> Result<f64, PriceFeedError>;
}

/// Indicative prices (EUR/t) for the reference fuels
pub fn default_prices() -> HashMap<String, f64> {
    [
        (names::HFO, 469.0),
        (names::LFO, 750.0),
        (names::MGO, 900.0),
        (names::LNG, 780.0),
        (names::LPG, 600.0),
        (names::FOSSIL_METHANOL, 380.0),
        (names::BIODIESEL_RAPESEED, 1175.0),
        (names::BIODIESEL_CORN, 1100.0),
        (names::BIODIESEL_WHEAT_STRAW, 900.0),
        (names::BIOETHANOL_SUGAR_BEET, 650.0),
        (names::BIOETHANOL_MAIZE, 700.0),
        (names::BIOETHANOL_WHEAT, 700.0),
        (names::BIODIESEL_UCO, 1175.0),
        (names::BIODIESEL_ANIMAL_FATS, 1150.0),
        (names::BIODIESEL_SUNFLOWER, 1175.0),
        (names::BIODIESEL_SOYBEAN, 1175.0),
        (names::BIODIESEL_PALM, 1175.0),
        (names::HVO, 1700.0),
        (names::FOSSIL_HYDROGEN, 344.0),
        (names::FOSSIL_AMMONIA, 500.0),
        (names::E_METHANOL, 1700.0),
        (names::E_LNG, 1500.0),
        (names::GREEN_HYDROGEN, 4200.0),
        (names::GREEN_AMMONIA, 900.0),
        (names::BIO_LNG, 1300.0),
        (names::BIO_METHANOL, 1450.0),
    ]
    .into_iter()
    .map(|(name, price)| (name.to_string(), price))
    .collect()
}

/// Price lookup with a short-lived cache in front of an optional live feed.
pub struct PriceBook {
    feed: Option<Box<dyn PriceFeed>>,
    defaults: HashMap<String, f64>,
    validity: Duration,
    cache: HashMap<String, (Instant, f64)>,
}

impl Default for PriceBook {
    fn default() -> Self {
        Self::with_defaults(default_prices())
    }
}

impl PriceBook {
    /// Validity window for fetched prices unless configured otherwise
    pub const DEFAULT_VALIDITY: Duration = Duration::from_secs(600);

    /// A book that only ever answers from the static table
    pub fn with_defaults(defaults: HashMap<String, f64>) -> Self {
        Self {
            feed: None,
            defaults,
            validity: Self::DEFAULT_VALIDITY,
            cache: HashMap::new(),
        }
    }

    pub fn with_feed(mut self, feed: Box<dyn PriceFeed>) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }

    /// Quote a price for `fuel`, or `None` if neither the feed nor the table knows it
    pub fn price(&mut self, fuel: &str) -> Option<FuelPrice> {
        self.price_at(fuel, Instant::now())
    }

    fn price_at(&mut self, fuel: &str, now: Instant) -> Option<FuelPrice> {
        if let Some(&(fetched_at, eur_per_tonne)) = self.cache.get(fuel) {
            if now.saturating_duration_since(fetched_at) < self.validity {
                return Some(FuelPrice {
                    eur_per_tonne,
                    origin: PriceOrigin::Cached,
                });
            }
        }

        if let Some(feed) = &self.feed {
            let fetched = feed.fetch(fuel).and_then(|value| {
                if value.is_finite() && value >= 0.0 {
                    Ok(value)
                } else {
                    Err(PriceFeedError::InvalidPrice {
                        fuel: fuel.to_string(),
                        value,
                    })
                }
            });
            match fetched {
                Ok(eur_per_tonne) => {
                    self.cache.insert(fuel.to_string(), (now, eur_per_tonne));
                    return Some(FuelPrice {
                        eur_per_tonne,
                        origin: PriceOrigin::Live,
                    });
                }
                Err(e) => warn!("{e}; falling back to the default price"),
            }
        }

        self.defaults.get(fuel).map(|&eur_per_tonne| FuelPrice {
            eur_per_tonne,
            origin: PriceOrigin::Default,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingFeed {
        calls: Rc<Cell<usize>>,
        price: Result<f64, PriceFeedError>,
    }

    impl PriceFeed for CountingFeed {
        fn fetch(&self, _fuel: &str) -> Result<f64, PriceFeedError> {
            self.calls.set(self.calls.get() + 1);
            self.price.clone()
        }
    }

    fn feed(price: Result<f64, PriceFeedError>) -> (Box<dyn PriceFeed>, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        (
            Box::new(CountingFeed {
                calls: calls.clone(),
                price,
            }),
            calls,
        )
    }

    #[test]
    fn test_defaults_without_feed() {
        let mut book = PriceBook::default();
        let price = book.price(names::HFO).unwrap();
        assert_eq!(price.eur_per_tonne, 469.0);
        assert_eq!(price.origin, PriceOrigin::Default);
        assert!(book.price("Unlisted").is_none());
    }

    #[test]
    fn test_live_price_is_cached() {
        let (feed, calls) = feed(Ok(520.0));
        let mut book = PriceBook::default().with_feed(feed);
        let now = Instant::now();

        let first = book.price_at(names::HFO, now).unwrap();
        assert_eq!(first.origin, PriceOrigin::Live);
        let second = book.price_at(names::HFO, now + Duration::from_secs(1)).unwrap();
        assert_eq!(second.origin, PriceOrigin::Cached);
        assert_eq!(second.eur_per_tonne, 520.0);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_expired_cache_refetches() {
        let (feed, calls) = feed(Ok(520.0));
        let mut book = PriceBook::default()
            .with_feed(feed)
            .with_validity(Duration::from_secs(60));
        let now = Instant::now();
        book.price_at(names::MGO, now);
        let later = book.price_at(names::MGO, now + Duration::from_secs(61)).unwrap();
        assert_eq!(later.origin, PriceOrigin::Live);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_feed_failure_falls_back_to_default() {
        let (feed, _) = feed(Err(PriceFeedError::Unavailable {
            fuel: names::MGO.to_string(),
            reason: "timeout".to_string(),
        }));
        let mut book = PriceBook::default().with_feed(feed);
        let price = book.price(names::MGO).unwrap();
        assert_eq!(price.origin, PriceOrigin::Default);
        assert_eq!(price.eur_per_tonne, 900.0);
    }

    #[test]
    fn test_invalid_live_price_rejected() {
        let (feed, _) = feed(Ok(f64::NAN));
        let mut book = PriceBook::default().with_feed(feed);
        assert_eq!(book.price(names::LNG).unwrap().origin, PriceOrigin::Default);
    }

    #[test]
    fn test_default_table_covers_reference_registry() {
        let prices = default_prices();
        for fuel in crate::fuel::FuelRegistry::reference().iter() {
            assert!(prices.contains_key(fuel.name()), "{} has no price", fuel.name());
        }
    }
}
