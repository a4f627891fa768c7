use std::sync::Arc;

use tracing::{error, info};

use crate::config::AppConfig;
use crate::config::schedule::ScheduleConfig;
use crate::core::scheduler::{Cadence, RefreshScheduler};
use crate::error::Result;
use crate::interfaces::balance_provider::{TokenBalance, WalletBalanceProvider};
use crate::observability::metrics::{
    PRICED_TOKENS, REFERENCE_ASSET_PRICE, REGISTRY_TOKENS, TOKEN_LOOKUPS,
};
use crate::price_infra::aggregator::PriceAggregator;
use crate::price_infra::connectors::dex_graph::DexPriceGraph;
use crate::price_infra::connectors::market::MarketPriceFetcher;
use crate::price_infra::connectors::reference::ReferenceAssetPriceFetcher;
use crate::price_infra::connectors::token_list::TokenListFetcher;
use crate::price_infra::connectors::{
    DerivedRatioSource, MarketPriceSource, ReferencePriceSource, TokenListSource,
};
use crate::price_infra::store::{PriceStore, TokenLookup};
use crate::price_infra::synthetic::SyntheticTokenPriceResolver;
use crate::types::quote::ReferenceAssetPrice;
use crate::types::token::{TokenIdentity, TokenPrice};

pub const TOKEN_LIST_JOB: &str = "token_list";
pub const MARKET_PRICES_JOB: &str = "market_prices";
pub const REFERENCE_PRICE_JOB: &str = "reference_price";

/// Upstream clients the service refreshes from.
pub struct Sources {
    pub token_list: Arc<dyn TokenListSource>,
    pub market: Arc<dyn MarketPriceSource>,
    pub reference: Arc<dyn ReferencePriceSource>,
    pub derived_ratio: Arc<dyn DerivedRatioSource>,
}

impl Sources {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Sources {
            token_list: Arc::new(TokenListFetcher::from_config(&config.sources)?),
            market: Arc::new(MarketPriceFetcher::from_config(&config.sources)?),
            reference: Arc::new(ReferenceAssetPriceFetcher::from_config(&config.sources)?),
            derived_ratio: Arc::new(DexPriceGraph::from_config(&config.sources)?),
        })
    }
}

/// Owns the refresh cycles and answers price queries from the committed state.
pub struct TokenPriceService {
    store: Arc<PriceStore>,
    token_list: Arc<dyn TokenListSource>,
    market: Arc<dyn MarketPriceSource>,
    reference: Arc<dyn ReferencePriceSource>,
    resolver: SyntheticTokenPriceResolver,
    aggregator: PriceAggregator,
    balances: Option<Arc<dyn WalletBalanceProvider>>,
}

impl TokenPriceService {
    pub fn new(synthetic: TokenIdentity, platform_id: u32, sources: Sources) -> Self {
        TokenPriceService {
            store: Arc::new(PriceStore::new(synthetic.clone())),
            token_list: sources.token_list,
            market: sources.market,
            reference: sources.reference,
            resolver: SyntheticTokenPriceResolver::new(
                synthetic.address.clone(),
                sources.derived_ratio,
            ),
            aggregator: PriceAggregator::new(platform_id, synthetic),
            balances: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            config.synthetic_token.identity(),
            config.sources.platform_id,
            Sources::from_config(config)?,
        ))
    }

    pub fn with_balance_provider(mut self, provider: Arc<dyn WalletBalanceProvider>) -> Self {
        self.balances = Some(provider);
        self
    }

    pub fn store(&self) -> &Arc<PriceStore> {
        &self.store
    }

    pub async fn refresh_token_list(&self) -> Result<()> {
        let listed = self.token_list.fetch_tokens().await?;
        let catalog = self.aggregator.catalog(listed);

        info!("Token list refreshed: {} tokens", catalog.len());
        self.store.commit_catalog(catalog);
        Ok(())
    }

    /// Fetches the bulk feed, prices the synthetic token and commits the merge.
    /// A failed fetch returns before anything is committed.
    pub async fn refresh_market_prices(&self) -> Result<()> {
        let listings = self.market.fetch_listings().await?;

        let reference = self.store.reference_price();
        let synthetic = self.resolver.resolve(reference.as_ref()).await;
        let catalog = self.store.catalog();

        let snapshot = self.aggregator.merge(&listings, synthetic, &catalog);
        let (registered, priced) = (snapshot.registry().len(), snapshot.prices().len());
        self.store.commit(snapshot);

        REGISTRY_TOKENS.set(registered as i64);
        PRICED_TOKENS.set(priced as i64);
        info!(
            "Market prices refreshed: {} listings, {} registered, {} priced",
            listings.len(),
            registered,
            priced
        );
        Ok(())
    }

    pub async fn refresh_reference_price(&self) -> Result<()> {
        let price = self.reference.fetch_reference_price().await?;
        self.store.set_reference_price(price);

        REFERENCE_ASSET_PRICE.set(price.usd);
        info!("Reference price refreshed: {} usd", price.usd);
        Ok(())
    }

    pub fn lookup(&self, address: &str) -> Option<TokenLookup> {
        self.store.lookup(address)
    }

    pub fn token_price(&self, address: &str) -> Option<TokenPrice> {
        TOKEN_LOOKUPS.inc();
        self.lookup(address).map(TokenPrice::from)
    }

    pub fn reference_price(&self) -> Option<ReferenceAssetPrice> {
        self.store.reference_price()
    }

    /// Valuates a wallet against the current snapshot. Provider failures are
    /// logged and reported as `None`.
    pub async fn token_balances(&self, wallet_address: &str) -> Option<Vec<TokenBalance>> {
        let provider = self.balances.as_ref()?;
        let snapshot = self.store.snapshot();

        match provider
            .fetch_balances(
                snapshot.registry(),
                wallet_address,
                self.store.reference_price(),
                snapshot.prices(),
            )
            .await
        {
            Ok(balances) => Some(balances),
            Err(e) => {
                error!("Balance lookup failed for {}: {}", wallet_address, e);
                None
            }
        }
    }

    /// The three refresh jobs, each running once at start.
    pub fn scheduler(self: &Arc<Self>, schedule: &ScheduleConfig) -> RefreshScheduler {
        let mut scheduler = RefreshScheduler::new();

        let service = Arc::clone(self);
        scheduler.add(
            TOKEN_LIST_JOB,
            Cadence::DailyAt(schedule.token_list_daily_at),
            true,
            move || {
                let service = Arc::clone(&service);
                async move { service.refresh_token_list().await }
            },
        );

        let service = Arc::clone(self);
        scheduler.add(
            MARKET_PRICES_JOB,
            Cadence::Every(schedule.market_prices_every()),
            true,
            move || {
                let service = Arc::clone(&service);
                async move { service.refresh_market_prices().await }
            },
        );

        let service = Arc::clone(self);
        scheduler.add(
            REFERENCE_PRICE_JOB,
            Cadence::Every(schedule.reference_price_every()),
            true,
            move || {
                let service = Arc::clone(&service);
                async move { service.refresh_reference_price().await }
            },
        );

        scheduler
    }
}
