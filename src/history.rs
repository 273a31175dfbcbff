//! Settled-round history records and fire-and-forget sinks

use crate::common::traits::HistorySink;
use crate::common::types::{Money, Multiplier, SubjectId};
use crate::games::types::{GameOutcome, GameType, ResultDetail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// One settled round, as handed to the external history store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub round_id: String,
    pub subject: SubjectId,
    pub game_type: GameType,
    pub bet_amount: Money,
    pub multiplier: Multiplier,
    pub payout: Money,
    /// `payout - bet_amount` in minor units
    pub profit: i64,
    pub result: GameOutcome,
    pub result_detail: ResultDetail,
    pub timestamp: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn new(
        round_id: String,
        subject: SubjectId,
        game_type: GameType,
        bet_amount: Money,
        multiplier: Multiplier,
        payout: Money,
        result_detail: ResultDetail,
    ) -> Self {
        let profit = payout.signed_diff(bet_amount).clamp(i64::MIN as i128, i64::MAX as i128) as i64;
        Self {
            round_id,
            subject,
            game_type,
            bet_amount,
            multiplier,
            payout,
            profit,
            result: GameOutcome::from_multiplier(multiplier),
            result_detail,
            timestamp: Utc::now(),
        }
    }
}

/// Forwards records to a bounded channel; drops (and logs) when it is full
#[derive(Clone)]
pub struct ChannelHistorySink {
    sender: mpsc::Sender<HistoryRecord>,
}

impl ChannelHistorySink {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<HistoryRecord>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }
}

impl HistorySink for ChannelHistorySink {
    fn record(&self, record: HistoryRecord) {
        if let Err(e) = self.sender.try_send(record) {
            let (reason, round_id) = match &e {
                mpsc::error::TrySendError::Full(r) => ("channel full", r.round_id.clone()),
                mpsc::error::TrySendError::Closed(r) => ("channel closed", r.round_id.clone()),
            };
            warn!(round_id = %round_id, "History record dropped: {}", reason);
        }
    }
}

/// Writes each record as a structured log line
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingHistorySink;

impl HistorySink for TracingHistorySink {
    fn record(&self, record: HistoryRecord) {
        info!(
            target: "wager_engine::history",
            round_id = %record.round_id,
            subject = %record.subject,
            game = %record.game_type,
            bet = %record.bet_amount,
            multiplier = %record.multiplier,
            payout = %record.payout,
            profit = record.profit,
            result = %record.result,
            "Round settled"
        );
    }
}
