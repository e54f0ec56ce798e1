use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::Cents;

/// Daily aggregate from `GET /dashboard/daily`, invalidated by every
/// appointment or comanda mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub appointments_total: u32,
    pub appointments_done: u32,
    pub cancelled: u32,
    pub no_show: u32,
    pub revenue_cents: Cents,
}

impl DailySummary {
    pub fn average_ticket_cents(&self) -> Cents {
        if self.appointments_done == 0 {
            return 0;
        }
        self.revenue_cents / i64::from(self.appointments_done)
    }
}
