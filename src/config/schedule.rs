use serde::Deserialize;
use std::time::Duration;

/// Wall-clock time of day, UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct DailyAt {
    pub hour: u32,
    pub minute: u32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub token_list_daily_at: DailyAt,
    pub market_prices_every_secs: u64,
    pub reference_price_every_secs: u64,
}

impl ScheduleConfig {
    pub fn market_prices_every(&self) -> Duration {
        Duration::from_secs(self.market_prices_every_secs)
    }

    pub fn reference_price_every(&self) -> Duration {
        Duration::from_secs(self.reference_price_every_secs)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            token_list_daily_at: DailyAt { hour: 8, minute: 0 },
            market_prices_every_secs: 30,
            reference_price_every_secs: 30,
        }
    }
}
