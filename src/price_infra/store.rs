use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use crate::types::address::Address;
use crate::types::quote::{PriceQuote, ReferenceAssetPrice, UsdPrice};
use crate::types::token::{PriceTable, TokenIdentity, TokenPrice, TokenRegistry};

/// Immutable registry and price table committed together.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Snapshot {
    registry: TokenRegistry,
    prices: PriceTable,
}

impl Snapshot {
    pub fn new(registry: TokenRegistry, prices: PriceTable) -> Self {
        Snapshot { registry, prices }
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// `None` for unregistered addresses; a zero quote for registered tokens
    /// that have no price entry.
    pub fn lookup(&self, address: &Address) -> Option<TokenLookup> {
        let identity = self.registry.get(address)?;
        let quote = self
            .prices
            .get(address)
            .copied()
            .unwrap_or_else(PriceQuote::zero);

        Some(TokenLookup {
            identity: identity.clone(),
            quote,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TokenLookup {
    pub identity: TokenIdentity,
    pub quote: PriceQuote,
}

impl From<TokenLookup> for TokenPrice {
    fn from(lookup: TokenLookup) -> Self {
        TokenPrice {
            token: lookup.identity,
            price: UsdPrice {
                usd: lookup.quote.usd,
            },
        }
    }
}

/// Latest committed state, shared by the refresh cycles and the query path.
///
/// Each component sits behind its own lock, held only to clone or replace an
/// `Arc`, so a reader sees either the old or the new snapshot and never a mix.
pub struct PriceStore {
    snapshot: RwLock<Arc<Snapshot>>,
    catalog: RwLock<Arc<TokenRegistry>>,
    reference_price: RwLock<Option<ReferenceAssetPrice>>,
    generation: AtomicU64,
}

impl PriceStore {
    /// Seeds both the catalog and the snapshot registry with the synthetic token.
    pub fn new(synthetic: TokenIdentity) -> Self {
        let registry = TokenRegistry::from_identities(vec![synthetic]);
        PriceStore {
            snapshot: RwLock::new(Arc::new(Snapshot::new(registry.clone(), PriceTable::new()))),
            catalog: RwLock::new(Arc::new(registry)),
            reference_price: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        let current = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*current)
    }

    pub fn lookup(&self, address: &str) -> Option<TokenLookup> {
        self.snapshot().lookup(&Address::new(address))
    }

    pub fn current_registry(&self) -> TokenRegistry {
        self.snapshot().registry().clone()
    }

    pub fn current_price_table(&self) -> PriceTable {
        self.snapshot().prices().clone()
    }

    pub fn catalog(&self) -> Arc<TokenRegistry> {
        let current = self.catalog.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*current)
    }

    pub fn reference_price(&self) -> Option<ReferenceAssetPrice> {
        *self.reference_price.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of snapshots committed since construction.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn commit(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        let mut current = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        *current = snapshot;
        // Bumped under the lock: a reader never sees a snapshot newer than `generation()`
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    pub fn commit_catalog(&self, catalog: TokenRegistry) {
        let catalog = Arc::new(catalog);
        *self.catalog.write().unwrap_or_else(PoisonError::into_inner) = catalog;
    }

    pub fn set_reference_price(&self, price: ReferenceAssetPrice) {
        *self.reference_price.write().unwrap_or_else(PoisonError::into_inner) = Some(price);
    }
}
