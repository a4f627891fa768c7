pub mod balance_provider;
