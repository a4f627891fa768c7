use std::collections::HashMap;

use crate::price_infra::store::Snapshot;
use crate::price_infra::{MarketEntry, PriceEntry, SyntheticQuote};
use crate::types::address::Address;
use crate::types::quote::PriceQuote;
use crate::types::token::{PriceTable, TokenIdentity, TokenRegistry};

/// Merges the bulk market feed, the synthetic quote and the token catalog into
/// one registry and one price table.
pub struct PriceAggregator {
    platform_id: u32,
    synthetic: TokenIdentity,
}

impl PriceAggregator {
    pub fn new(platform_id: u32, synthetic: TokenIdentity) -> Self {
        PriceAggregator {
            platform_id,
            synthetic,
        }
    }

    /// The synthetic identity followed by the listed tokens, deduplicated.
    pub fn catalog(&self, listed: Vec<TokenIdentity>) -> TokenRegistry {
        TokenRegistry::from_identities(std::iter::once(self.synthetic.clone()).chain(listed))
    }

    pub fn merge(
        &self,
        listings: &[MarketEntry],
        synthetic_quote: SyntheticQuote,
        catalog: &TokenRegistry,
    ) -> Snapshot {
        // Step 1: Keep target-chain entries, then append the synthetic entry
        let entries = index_entries(
            self.filter_platform(listings)
                .chain(std::iter::once(PriceEntry::from(synthetic_quote))),
        );

        // Step 2: Synthetic identity first, then every priced catalog token
        let registry = TokenRegistry::from_identities(
            std::iter::once(self.synthetic.clone()).chain(
                catalog
                    .iter()
                    .filter(|token| entries.contains_key(&token.address))
                    .cloned(),
            ),
        );

        // Step 3: Quote every registered token that has an entry
        let prices: PriceTable = registry
            .iter()
            .filter_map(|token| {
                entries
                    .get(&token.address)
                    .map(|entry| (token.address.clone(), quote_from_entry(entry)))
            })
            .collect();

        Snapshot::new(registry, prices)
    }

    fn filter_platform<'a>(
        &'a self,
        listings: &'a [MarketEntry],
    ) -> impl Iterator<Item = PriceEntry> + 'a {
        listings
            .iter()
            .filter(move |l| l.platform_id == Some(self.platform_id))
            .filter_map(|l| {
                let address = l.token_address.clone().filter(|a| !a.is_empty())?;
                Some(PriceEntry {
                    address,
                    quote: l.quote,
                    usd: None,
                })
            })
    }
}

/// Builds the address index of price entries. First entry wins on collision.
pub fn index_entries<I>(entries: I) -> HashMap<Address, PriceEntry>
where
    I: IntoIterator<Item = PriceEntry>,
{
    let mut index = HashMap::new();
    for entry in entries {
        index.entry(entry.address.clone()).or_insert(entry);
    }
    index
}

/// Market quote fields when present, otherwise the plain `usd` value.
/// 1h and 24h fall back to zero; 7d is left absent.
pub fn quote_from_entry(entry: &PriceEntry) -> PriceQuote {
    let market = entry.quote.unwrap_or_default();
    PriceQuote {
        usd: market.price.or(entry.usd).unwrap_or(0.0),
        percent_change_1h: market.percent_change_1h.unwrap_or(0.0),
        percent_change_24h: market.percent_change_24h.unwrap_or(0.0),
        percent_change_7d: market.percent_change_7d,
    }
}
