//! Current funding standings, rebuilt from indexed events.
//!
//! Mirrors the contract's bookkeeping off-chain: every `withdrawn` event
//! wipes the slate, and each later `funded` event adds to its funder's
//! total. Funders are listed in first-contribution order.

use serde::Serialize;

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, EventRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunderStanding {
    pub funder: String,
    /// Cumulative amount since the last withdrawal, as a decimal string.
    pub amount: String,
    pub contributions: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standings {
    pub funders: Vec<FunderStanding>,
    /// Sum of `funded` amounts since the last withdrawal. Value sent to the
    /// contract outside `fund` emits no event, so the on-chain `balance()`
    /// can be higher.
    pub contributed: String,
    /// Ledger of the most recent withdrawal, if any.
    pub last_withdrawal_ledger: Option<i64>,
}

/// Fold `events` (ledger order) into the standings of the open funding cycle.
pub fn compute(events: &[EventRecord]) -> Result<Standings> {
    let withdrawn = EventKind::Withdrawn.as_str();
    let funded = EventKind::Funded.as_str();

    let last_withdrawal = events.iter().rposition(|e| e.event_type == withdrawn);
    let open_cycle = match last_withdrawal {
        Some(pos) => &events[pos + 1..],
        None => events,
    };

    let mut totals: Vec<(String, i128, u32)> = Vec::new();
    let mut contributed: i128 = 0;

    for event in open_cycle.iter().filter(|e| e.event_type == funded) {
        let Some(funder) = event.actor.as_deref() else {
            continue;
        };
        let amount = parse_amount(event)?;

        contributed = contributed.checked_add(amount).ok_or_else(|| overflow(event))?;
        match totals.iter_mut().find(|(f, _, _)| f == funder) {
            Some((_, total, count)) => {
                *total = total.checked_add(amount).ok_or_else(|| overflow(event))?;
                *count += 1;
            }
            None => totals.push((funder.to_string(), amount, 1)),
        }
    }

    Ok(Standings {
        funders: totals
            .into_iter()
            .map(|(funder, amount, contributions)| FunderStanding {
                funder,
                amount: amount.to_string(),
                contributions,
            })
            .collect(),
        contributed: contributed.to_string(),
        last_withdrawal_ledger: last_withdrawal.map(|pos| events[pos].ledger),
    })
}

fn parse_amount(event: &EventRecord) -> Result<i128> {
    let raw = event.amount.as_deref().unwrap_or_default();
    raw.parse::<i128>()
        .map_err(|_| IndexerError::InvalidAmount {
            event_id: event.id,
            value: raw.to_string(),
        })
}

fn overflow(event: &EventRecord) -> IndexerError {
    IndexerError::InvalidAmount {
        event_id: event.id,
        value: "overflow".to_string(),
    }
}
