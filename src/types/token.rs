use im::{HashMap, Vector};
use serde::{Deserialize, Serialize, Serializer};

use crate::types::address::Address;
use crate::types::quote::{PriceQuote, UsdPrice};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenIdentity {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenIdentity {
    pub fn new(address: &str, name: &str, symbol: &str, decimals: u8) -> Self {
        TokenIdentity {
            address: Address::new(address),
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
        }
    }
}

/// Ordered, address-unique sequence of token identities.
///
/// Collision policy: the first identity seen for an address is kept and later
/// ones are dropped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenRegistry {
    tokens: Vector<TokenIdentity>,
    index: HashMap<Address, usize>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_identities<I>(identities: I) -> Self
    where
        I: IntoIterator<Item = TokenIdentity>,
    {
        let mut registry = TokenRegistry::new();
        for identity in identities {
            registry.insert_first_wins(identity);
        }
        registry
    }

    /// Appends `identity` unless its address is already registered.
    /// Returns whether it was inserted.
    pub fn insert_first_wins(&mut self, identity: TokenIdentity) -> bool {
        if self.index.contains_key(&identity.address) {
            return false;
        }
        self.index.insert(identity.address.clone(), self.tokens.len());
        self.tokens.push_back(identity);
        true
    }

    pub fn get(&self, address: &Address) -> Option<&TokenIdentity> {
        self.index.get(address).and_then(|&i| self.tokens.get(i))
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.index.contains_key(address)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TokenIdentity> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Serialize for TokenRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.tokens.iter())
    }
}

/// Address-keyed fiat quotes. Keys are always registered in the registry
/// committed alongside the table.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceTable(HashMap<Address, PriceQuote>);

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: Address, quote: PriceQuote) {
        self.0.insert(address, quote);
    }

    pub fn get(&self, address: &Address) -> Option<&PriceQuote> {
        self.0.get(address)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.0.contains_key(address)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &PriceQuote)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Address, PriceQuote)> for PriceTable {
    fn from_iter<I: IntoIterator<Item = (Address, PriceQuote)>>(iter: I) -> Self {
        PriceTable(iter.into_iter().collect())
    }
}

/// Public lookup result: the identity fields plus `price: {usd}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TokenPrice {
    #[serde(flatten)]
    pub token: TokenIdentity,
    pub price: UsdPrice,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn first_identity_wins_on_address_collision() {
        let registry = TokenRegistry::from_identities(vec![
            TokenIdentity::new("0xENB", "Earnbase", "ENB", 18),
            TokenIdentity::new("0xenb", "Impostor", "FAKE", 6),
            TokenIdentity::new("0xAAA", "Token A", "TKA", 18),
        ]);

        assert_eq!(registry.len(), 2);
        let enb = registry.get(&Address::new("0xEnB")).unwrap();
        assert_eq!(enb.symbol, "ENB");
        assert_eq!(
            registry.iter().map(|t| t.symbol.as_str()).collect::<Vec<_>>(),
            vec!["ENB", "TKA"]
        );
    }

    #[test]
    fn registry_serializes_as_ordered_list() {
        let registry = TokenRegistry::from_identities(vec![
            TokenIdentity::new("0xB", "B", "B", 8),
            TokenIdentity::new("0xA", "A", "A", 18),
        ]);

        assert_eq!(
            serde_json::to_value(&registry).unwrap(),
            json!([
                {"address": "0xb", "name": "B", "symbol": "B", "decimals": 8},
                {"address": "0xa", "name": "A", "symbol": "A", "decimals": 18},
            ])
        );
    }

    #[test]
    fn token_price_flattens_identity() {
        let price = TokenPrice {
            token: TokenIdentity::new("0xAAA", "Token A", "TKA", 18),
            price: UsdPrice { usd: 1.5 },
        };

        assert_eq!(
            serde_json::to_value(&price).unwrap(),
            json!({
                "address": "0xaaa",
                "name": "Token A",
                "symbol": "TKA",
                "decimals": 18,
                "price": {"usd": 1.5},
            })
        );
    }

    proptest! {
        #[test]
        fn registry_holds_one_entry_per_address_ignoring_case(
            raw in proptest::collection::vec("0x[0-9a-fA-F]{1,4}", 0..40)
        ) {
            let registry = TokenRegistry::from_identities(
                raw.iter().map(|a| TokenIdentity::new(a, "T", "T", 18)),
            );

            let distinct: HashSet<String> = raw.iter().map(|a| a.to_ascii_lowercase()).collect();
            prop_assert_eq!(registry.len(), distinct.len());
            for address in &raw {
                prop_assert!(registry.contains(&Address::new(address)));
            }
        }
    }
}
