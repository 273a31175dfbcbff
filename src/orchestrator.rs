//! Wager orchestrator
//!
//! The only component that sequences the others: validate, reserve the bet,
//! draw the outcome, credit the payout, then hand a record to the history
//! sink. Interactive rounds keep their bet reserved in [`ActiveRounds`]
//! until they settle. A round whose payout could not be credited stays in the
//! pool, and the next action on it retries the settlement.

use crate::common::traits::HistorySink;
use crate::common::types::{Money, Multiplier, SubjectId};
use crate::errors::{EngineError, EngineResult, InvariantViolation, ValidationError};
use crate::games::blackjack::BlackjackRound;
use crate::games::crash::{CrashRound, CrashSetup};
use crate::games::mines::{MinesRound, MinesSetup};
use crate::games::types::{Card, GameParams, GameType, WagerOutcome, WagerRequest};
use crate::games::{ActiveRound, ActiveRounds, GameProcessor, GameRules, RoundState};
use crate::history::HistoryRecord;
use crate::ledger::{Wallet, WalletLedger};
use crate::metrics::RtpMonitor;
use crate::rng::RandomSource;
use chrono::{Duration, Utc};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// A settled round
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    pub round_id: String,
    pub bet: Money,
    pub outcome: WagerOutcome,
    /// Wallet after the payout was credited
    pub wallet: Wallet,
}

/// What the player may see of an unsettled round
#[derive(Debug, Clone, PartialEq)]
pub enum RoundView {
    Mines {
        grid_size: u32,
        mines: u32,
        revealed: Vec<u32>,
        multiplier: Multiplier,
        next_multiplier: Option<Multiplier>,
    },
    /// The crash point stays hidden; clients draw `e^(g * tick)`
    Crash { growth_per_tick: f64 },
    Blackjack {
        player: Vec<Card>,
        dealer_up: Option<Card>,
        player_total: u32,
    },
}

impl RoundView {
    fn of(state: &RoundState) -> Self {
        match state {
            RoundState::Mines(round) => RoundView::Mines {
                grid_size: round.setup().grid_size,
                mines: round.setup().mines,
                revealed: round.revealed().to_vec(),
                multiplier: round.current_multiplier(),
                next_multiplier: round.next_multiplier(),
            },
            RoundState::Crash(round) => RoundView::Crash {
                growth_per_tick: round.setup().growth_per_tick,
            },
            RoundState::Blackjack(round) => RoundView::Blackjack {
                player: round.player_cards().to_vec(),
                dealer_up: round.dealer_up_card(),
                player_total: round.player_total(),
            },
        }
    }
}

/// Result of `play` or of an interactive round step
#[derive(Debug, Clone, PartialEq)]
pub enum PlayResult {
    Settled(RoundReport),
    InProgress { round_id: String, view: RoundView },
    /// The bet exceeded the balance; nothing was drawn or debited
    InsufficientFunds,
}

impl PlayResult {
    pub fn report(&self) -> Option<&RoundReport> {
        match self {
            PlayResult::Settled(report) => Some(report),
            _ => None,
        }
    }

    pub fn round_id(&self) -> Option<&str> {
        match self {
            PlayResult::Settled(report) => Some(&report.round_id),
            PlayResult::InProgress { round_id, .. } => Some(round_id),
            PlayResult::InsufficientFunds => None,
        }
    }
}

pub struct WagerOrchestrator {
    ledger: Arc<WalletLedger>,
    processor: GameProcessor,
    rng: Mutex<Box<dyn RandomSource>>,
    history: Arc<dyn HistorySink>,
    rounds: ActiveRounds,
    monitor: RtpMonitor,
}

impl WagerOrchestrator {
    pub fn new(
        ledger: Arc<WalletLedger>,
        rules: Arc<GameRules>,
        rng: Box<dyn RandomSource>,
        history: Arc<dyn HistorySink>,
    ) -> Self {
        Self {
            ledger,
            processor: GameProcessor::new(rules),
            rng: Mutex::new(rng),
            history,
            rounds: ActiveRounds::new(),
            monitor: RtpMonitor::new(),
        }
    }

    pub fn ledger(&self) -> &WalletLedger {
        &self.ledger
    }

    pub fn rules(&self) -> &GameRules {
        self.processor.rules()
    }

    pub fn active_rounds(&self) -> &ActiveRounds {
        &self.rounds
    }

    pub fn monitor(&self) -> &RtpMonitor {
        &self.monitor
    }

    // ----- Wallet access -----

    /// Debit a display amount. `false` when it is not positive or exceeds
    /// the balance; NaN is rejected.
    pub async fn place_bet(&self, subject: &SubjectId, amount: f64) -> EngineResult<bool> {
        if amount.is_nan() {
            return Err(ValidationError::InvalidAmount(amount.to_string()).into());
        }
        if amount <= 0.0 {
            debug!(%subject, amount, "Reserve refused");
            return Ok(false);
        }
        let amount = Money::try_from_f64(amount)?;
        self.ledger.reserve(subject, amount).await
    }

    /// Credit a display amount. A negative amount is a caller bug.
    pub async fn credit_win(&self, subject: &SubjectId, amount: f64) -> EngineResult<()> {
        if amount < 0.0 {
            error!(%subject, amount, "Negative credit rejected");
            return Err(InvariantViolation::NegativeCredit(amount.to_string()).into());
        }
        let amount = Money::try_from_f64(amount)?;
        self.ledger.credit(subject, amount).await?;
        Ok(())
    }

    pub async fn reset_wallet(&self, subject: &SubjectId) -> EngineResult<Wallet> {
        self.ledger.reset(subject).await
    }

    pub async fn wallet(&self, subject: &SubjectId) -> EngineResult<Wallet> {
        self.ledger.read(subject).await
    }

    // ----- One-shot rounds -----

    /// Resolve a request without touching the ledger
    pub fn resolve(&self, request: &WagerRequest) -> EngineResult<WagerOutcome> {
        self.with_rng(|rng| self.processor.resolve(request, rng))
    }

    /// Full cycle: validate, reserve, resolve, credit, record
    pub async fn play(&self, subject: &SubjectId, bet: Money, params: GameParams) -> EngineResult<PlayResult> {
        let request = WagerRequest::new(subject.clone(), bet, params);
        let game = self.processor.prepare(&request).map_err(|e| {
            warn!(%subject, game = %request.game_type(), %bet, "Bet rejected: {}", e);
            EngineError::from(e)
        })?;

        if !self.ledger.reserve(subject, bet).await? {
            warn!(%subject, game = %request.game_type(), %bet, "Insufficient funds");
            return Ok(PlayResult::InsufficientFunds);
        }

        let outcome = match self.with_rng(|rng| self.processor.price(&request, &game, rng)) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.void_round(subject, bet, &e).await;
                return Err(e);
            }
        };

        let report = self.settle(Uuid::new_v4().to_string(), subject, bet, outcome).await?;
        Ok(PlayResult::Settled(report))
    }

    // ----- Mines -----

    pub async fn start_mines(&self, subject: &SubjectId, bet: Money, mines: u32) -> EngineResult<PlayResult> {
        let setup = MinesSetup::new(mines, self.rules())?;
        self.start_round(subject, bet, GameType::Mines, |rng| {
            Ok(RoundState::Mines(MinesRound::start(setup, rng)?))
        })
        .await
    }

    pub async fn reveal_mine(&self, subject: &SubjectId, round_id: &str, cell: u32) -> EngineResult<PlayResult> {
        self.act(subject, round_id, |state| match state {
            RoundState::Mines(round) => round.reveal(cell).map(|_| ()),
            _ => Err(wrong_kind(round_id, "mines")),
        })
        .await
    }

    pub async fn cash_out_mines(&self, subject: &SubjectId, round_id: &str) -> EngineResult<PlayResult> {
        self.act(subject, round_id, |state| match state {
            RoundState::Mines(round) => round.cash_out().map(|_| ()),
            _ => Err(wrong_kind(round_id, "mines")),
        })
        .await
    }

    // ----- Crash -----

    pub async fn start_crash(&self, subject: &SubjectId, bet: Money) -> EngineResult<PlayResult> {
        let setup = CrashSetup::from_rules(self.rules());
        self.start_round(subject, bet, GameType::Crash, |rng| {
            Ok(RoundState::Crash(CrashRound::start(setup, rng)?))
        })
        .await
    }

    /// Cash out at the tick the player acted on; late ticks lose
    pub async fn cash_out_crash(&self, subject: &SubjectId, round_id: &str, tick: u64) -> EngineResult<PlayResult> {
        self.act(subject, round_id, |state| match state {
            RoundState::Crash(round) => round.cash_out(tick).map(|_| ()),
            _ => Err(wrong_kind(round_id, "crash")),
        })
        .await
    }

    /// Settle a crash round the player never cashed out of
    pub async fn finish_crash(&self, subject: &SubjectId, round_id: &str) -> EngineResult<PlayResult> {
        self.act(subject, round_id, |state| match state {
            RoundState::Crash(round) => round.bust(),
            _ => Err(wrong_kind(round_id, "crash")),
        })
        .await
    }

    // ----- Blackjack -----

    pub async fn deal_blackjack(&self, subject: &SubjectId, bet: Money) -> EngineResult<PlayResult> {
        self.start_round(subject, bet, GameType::Blackjack, |rng| {
            Ok(RoundState::Blackjack(BlackjackRound::deal(rng)?))
        })
        .await
    }

    pub async fn hit_blackjack(&self, subject: &SubjectId, round_id: &str) -> EngineResult<PlayResult> {
        self.act(subject, round_id, |state| match state {
            RoundState::Blackjack(round) => round.hit().map(|_| ()),
            _ => Err(wrong_kind(round_id, "blackjack")),
        })
        .await
    }

    pub async fn stand_blackjack(&self, subject: &SubjectId, round_id: &str) -> EngineResult<PlayResult> {
        self.act(subject, round_id, |state| match state {
            RoundState::Blackjack(round) => round.stand(),
            _ => Err(wrong_kind(round_id, "blackjack")),
        })
        .await
    }

    // ----- Abandoned rounds -----

    /// End a round without a player decision: mines forfeits, crash busts
    /// and blackjack stands on the current hand
    pub async fn abandon_round(&self, subject: &SubjectId, round_id: &str) -> EngineResult<PlayResult> {
        self.act(subject, round_id, RoundState::abandon).await
    }

    /// Abandon every round older than `max_age`. Rounds that fail to settle
    /// stay in the pool for the next sweep.
    pub async fn expire_rounds(&self, max_age: Duration) -> Vec<RoundReport> {
        let stale = self.rounds.started_before(Utc::now() - max_age);
        let mut reports = Vec::with_capacity(stale.len());
        for (subject, round_id) in stale {
            match self.abandon_round(&subject, &round_id).await {
                Ok(PlayResult::Settled(report)) => reports.push(report),
                Ok(_) => {}
                Err(e) => warn!(%subject, %round_id, "Expiring round failed: {}", e),
            }
        }
        if !reports.is_empty() {
            info!(expired = reports.len(), "Expired abandoned rounds");
        }
        reports
    }

    // ----- Internals -----

    fn with_rng<T>(&self, f: impl FnOnce(&mut dyn RandomSource) -> EngineResult<T>) -> EngineResult<T> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(rng.as_mut())
    }

    async fn start_round(
        &self,
        subject: &SubjectId,
        bet: Money,
        game: GameType,
        build: impl FnOnce(&mut dyn RandomSource) -> EngineResult<RoundState>,
    ) -> EngineResult<PlayResult> {
        self.rules().check_bet(bet).map_err(|e| {
            warn!(%subject, %game, %bet, "Bet rejected: {}", e);
            EngineError::from(e)
        })?;

        if !self.ledger.reserve(subject, bet).await? {
            warn!(%subject, %game, %bet, "Insufficient funds");
            return Ok(PlayResult::InsufficientFunds);
        }

        let state = match self.with_rng(build) {
            Ok(state) => state,
            Err(e) => {
                self.void_round(subject, bet, &e).await;
                return Err(e);
            }
        };

        let round = ActiveRound::new(subject.clone(), bet, state);
        if round.state.is_finished() {
            return self.settle_round(round).await;
        }

        let view = RoundView::of(&round.state);
        let round_id = self.rounds.insert(round);
        debug!(%subject, %game, %bet, %round_id, "Round started");
        Ok(PlayResult::InProgress { round_id, view })
    }

    async fn act<F>(&self, subject: &SubjectId, round_id: &str, action: F) -> EngineResult<PlayResult>
    where
        F: FnOnce(&mut RoundState) -> EngineResult<()>,
    {
        // A finished round still in the pool failed to settle earlier
        if let Some(round) = self.rounds.take_finished(subject, round_id) {
            warn!(%subject, %round_id, "Retrying settlement");
            return self.settle_round(round).await;
        }

        let ((), snapshot) = self.rounds.act(subject, round_id, action)?;
        if !snapshot.state.is_finished() {
            return Ok(PlayResult::InProgress {
                round_id: round_id.to_string(),
                view: RoundView::of(&snapshot.state),
            });
        }

        // Whoever finished the round under the entry lock settles it
        let round = self
            .rounds
            .take_finished(subject, round_id)
            .ok_or_else(|| ValidationError::UnknownRound(round_id.to_string()))?;
        self.settle_round(round).await
    }

    /// Settle a finished round, returning it to the pool if the payout
    /// could not be credited
    async fn settle_round(&self, round: ActiveRound) -> EngineResult<PlayResult> {
        match self.settle_finished(&round).await {
            Ok(report) => Ok(PlayResult::Settled(report)),
            Err(e) => {
                self.rounds.insert(round);
                Err(e)
            }
        }
    }

    async fn settle_finished(&self, round: &ActiveRound) -> EngineResult<RoundReport> {
        let multiplier = round.state.final_multiplier();
        let payout = round
            .bet
            .times(multiplier)
            .ok_or(InvariantViolation::Overflow("payout"))?;
        let outcome = WagerOutcome {
            game_type: round.state.game_type(),
            detail: round.state.detail(),
            multiplier,
            payout,
        };
        self.settle(round.round_id.clone(), &round.subject, round.bet, outcome)
            .await
    }

    async fn settle(
        &self,
        round_id: String,
        subject: &SubjectId,
        bet: Money,
        outcome: WagerOutcome,
    ) -> EngineResult<RoundReport> {
        let wallet = self.ledger.credit(subject, outcome.payout).await.map_err(|e| {
            error!(%subject, %round_id, payout = %outcome.payout, "Payout credit failed: {}", e);
            e
        })?;

        let record = HistoryRecord::new(
            round_id.clone(),
            subject.clone(),
            outcome.game_type,
            bet,
            outcome.multiplier,
            outcome.payout,
            outcome.detail.clone(),
        );
        self.monitor.record_round(bet, outcome.payout, record.result);
        self.history.record(record);

        debug!(
            %subject,
            %round_id,
            game = %outcome.game_type,
            %bet,
            multiplier = %outcome.multiplier,
            payout = %outcome.payout,
            "Round settled"
        );

        Ok(RoundReport {
            round_id,
            bet,
            outcome,
            wallet,
        })
    }

    /// A round failed after its bet was reserved; return the stake
    async fn void_round(&self, subject: &SubjectId, bet: Money, cause: &EngineError) {
        error!(%subject, %bet, "Round failed after reserve, refunding stake: {}", cause);
        if let Err(e) = self.ledger.credit(subject, bet).await {
            error!(%subject, %bet, "Stake refund failed: {}", e);
        }
    }
}

fn wrong_kind(round_id: &str, expected: &'static str) -> EngineError {
    ValidationError::WrongRoundKind {
        round_id: round_id.to_string(),
        expected,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::games::types::{DiceDirection, GameOutcome, HandOutcome, ResultDetail};
    use crate::history::ChannelHistorySink;
    use crate::ledger::SessionStore;
    use crate::rng::ScriptedDraws;
    use tokio::sync::mpsc;

    fn orchestrator(draws: Vec<f64>) -> (WagerOrchestrator, mpsc::Receiver<HistoryRecord>) {
        let config = EngineConfig::default();
        let rules = Arc::new(GameRules::new(&config).unwrap());
        let ledger = Arc::new(WalletLedger::new(
            Arc::new(SessionStore::new()),
            config.limits.default_balance,
        ));
        let (sink, receiver) = ChannelHistorySink::new(64);
        let orchestrator = WagerOrchestrator::new(ledger, rules, Box::new(ScriptedDraws::new(draws)), Arc::new(sink));
        (orchestrator, receiver)
    }

    fn dice_over_50() -> GameParams {
        GameParams::Dice {
            target: 50.0,
            direction: DiceDirection::Over,
        }
    }

    #[tokio::test]
    async fn test_play_win_credits_and_records() {
        let (engine, mut history) = orchestrator(vec![0.9]);
        let subject = SubjectId::session("s1");

        let result = engine.play(&subject, Money::from_units(10), dice_over_50()).await.unwrap();
        let report = result.report().unwrap();
        assert_eq!(report.outcome.payout, Money::from_cents(1_980));
        assert_eq!(report.wallet.balance, Money::from_cents(100_000 - 1_000 + 1_980));
        assert_eq!(report.wallet.total_wagered, Money::from_units(10));
        assert_eq!(report.wallet.total_won, Money::from_cents(1_980));

        let record = history.recv().await.unwrap();
        assert_eq!(record.round_id, report.round_id);
        assert_eq!(record.profit, 980);
        assert_eq!(record.result, GameOutcome::Win);
        assert_eq!(engine.monitor().rounds(), 1);
    }

    #[tokio::test]
    async fn test_play_loss_keeps_stake() {
        let (engine, _history) = orchestrator(vec![0.1]);
        let subject = SubjectId::session("s1");

        let result = engine.play(&subject, Money::from_units(10), dice_over_50()).await.unwrap();
        let report = result.report().unwrap();
        assert_eq!(report.outcome.payout, Money::ZERO);
        assert_eq!(report.wallet.balance, Money::from_units(990));
        assert_eq!(report.wallet.total_won, Money::ZERO);
    }

    #[tokio::test]
    async fn test_insufficient_funds_draws_nothing() {
        let (engine, mut history) = orchestrator(vec![0.9]);
        let subject = SubjectId::session("s1");
        engine.ledger().reserve(&subject, Money::from_units(995)).await.unwrap();

        let result = engine.play(&subject, Money::from_units(10), dice_over_50()).await.unwrap();
        assert_eq!(result, PlayResult::InsufficientFunds);
        assert_eq!(engine.wallet(&subject).await.unwrap().balance, Money::from_units(5));
        assert!(history.try_recv().is_err());

        // The scripted draw is still available
        let outcome = engine
            .resolve(&WagerRequest::new(subject, Money::from_units(1), dice_over_50()))
            .unwrap();
        assert_eq!(outcome.result(), GameOutcome::Win);
    }

    #[tokio::test]
    async fn test_validation_failure_touches_nothing() {
        let (engine, _history) = orchestrator(vec![]);
        let subject = SubjectId::session("s1");

        let err = engine
            .play(&subject, Money::from_units(1), GameParams::Keno { picks: vec![] })
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let wallet = engine.wallet(&subject).await.unwrap();
        assert_eq!(wallet.total_wagered, Money::ZERO);
    }

    #[tokio::test]
    async fn test_generator_failure_refunds_stake() {
        // No draws scripted: the generator fails after the reserve
        let (engine, _history) = orchestrator(vec![]);
        let subject = SubjectId::session("s1");

        let err = engine.play(&subject, Money::from_units(10), dice_over_50()).await.unwrap_err();
        assert!(err.is_invariant());
        assert_eq!(engine.wallet(&subject).await.unwrap().balance, Money::from_units(1_000));
    }

    #[tokio::test]
    async fn test_negative_credit_is_invariant_error() {
        let (engine, _history) = orchestrator(vec![]);
        let err = engine.credit_win(&SubjectId::session("s1"), -1.0).await.unwrap_err();
        assert!(err.is_invariant());
    }

    #[tokio::test]
    async fn test_place_bet_and_credit_win() {
        let (engine, _history) = orchestrator(vec![]);
        let subject = SubjectId::session("s1");

        assert!(engine.place_bet(&subject, 12.5).await.unwrap());
        assert!(!engine.place_bet(&subject, 0.0).await.unwrap());
        assert!(!engine.place_bet(&subject, -3.0).await.unwrap());
        assert!(!engine.place_bet(&subject, f64::NEG_INFINITY).await.unwrap());
        assert!(!engine.place_bet(&subject, 5_000.0).await.unwrap());
        assert!(engine.place_bet(&subject, f64::NAN).await.is_err());
        engine.credit_win(&subject, 2.5).await.unwrap();

        let wallet = engine.wallet(&subject).await.unwrap();
        assert_eq!(wallet.balance, Money::from_cents(100_000 - 1_250 + 250));
    }

    #[tokio::test]
    async fn test_interactive_mines_cash_out() {
        let (engine, mut history) = orchestrator(vec![0.0; 3]);
        let subject = SubjectId::session("s1");

        let started = engine.start_mines(&subject, Money::from_units(10), 3).await.unwrap();
        let round_id = started.round_id().unwrap().to_string();
        assert!(matches!(started, PlayResult::InProgress { .. }));
        assert_eq!(engine.wallet(&subject).await.unwrap().balance, Money::from_units(990));

        // Mines sit on cells 0, 1 and 2 with all-zero draws
        let step = engine.reveal_mine(&subject, &round_id, 10).await.unwrap();
        match step {
            PlayResult::InProgress {
                view: RoundView::Mines { multiplier, .. },
                ..
            } => assert!(multiplier > Multiplier::ONE),
            other => panic!("unexpected step {:?}", other),
        }

        let settled = engine.cash_out_mines(&subject, &round_id).await.unwrap();
        let report = settled.report().unwrap();
        assert!(report.outcome.payout > Money::from_units(10));
        assert!(!engine.active_rounds().is_active(&round_id));
        assert_eq!(history.recv().await.unwrap().game_type, GameType::Mines);

        // Settled rounds cannot be acted on again
        assert!(engine.cash_out_mines(&subject, &round_id).await.is_err());
    }

    #[tokio::test]
    async fn test_interactive_mines_hit() {
        let (engine, _history) = orchestrator(vec![0.0; 3]);
        let subject = SubjectId::session("s1");

        let started = engine.start_mines(&subject, Money::from_units(10), 3).await.unwrap();
        let round_id = started.round_id().unwrap().to_string();
        let settled = engine.reveal_mine(&subject, &round_id, 0).await.unwrap();
        let report = settled.report().unwrap();
        assert_eq!(report.outcome.multiplier, Multiplier::ZERO);
        assert!(matches!(report.outcome.detail, ResultDetail::Mines { hit_mine: Some(0), .. }));
        assert_eq!(report.wallet.balance, Money::from_units(990));
    }

    #[tokio::test]
    async fn test_wrong_round_kind() {
        let (engine, _history) = orchestrator(vec![0.0; 3]);
        let subject = SubjectId::session("s1");
        let started = engine.start_mines(&subject, Money::from_units(1), 3).await.unwrap();
        let round_id = started.round_id().unwrap().to_string();

        let err = engine.hit_blackjack(&subject, &round_id).await.unwrap_err();
        assert!(err.is_validation());
        assert!(engine.active_rounds().is_active(&round_id));
    }

    #[tokio::test]
    async fn test_crash_instant_bust_loses_cash_out() {
        let (engine, _history) = orchestrator(vec![0.0]);
        let subject = SubjectId::session("s1");

        let started = engine.start_crash(&subject, Money::from_units(10)).await.unwrap();
        let round_id = started.round_id().unwrap().to_string();
        let settled = engine.cash_out_crash(&subject, &round_id, 0).await.unwrap();
        let report = settled.report().unwrap();
        assert_eq!(report.outcome.payout, Money::ZERO);
        assert!(matches!(
            report.outcome.detail,
            ResultDetail::Crash {
                instant_bust: true,
                cashed_out_at: None,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_crash_cash_out_in_time() {
        // Not an instant bust; r = 0.25 puts the crash point at 4.04x
        let (engine, _history) = orchestrator(vec![0.5, 0.25]);
        let subject = SubjectId::session("s1");

        let started = engine.start_crash(&subject, Money::from_units(10)).await.unwrap();
        let round_id = started.round_id().unwrap().to_string();
        // e^(0.01 * 69) = 1.99
        let settled = engine.cash_out_crash(&subject, &round_id, 69).await.unwrap();
        let report = settled.report().unwrap();
        assert_eq!(report.outcome.multiplier, Multiplier::from_hundredths(199));
        assert_eq!(report.outcome.payout, Money::from_cents(1_990));
    }

    #[tokio::test]
    async fn test_abandon_crash_busts() {
        let (engine, mut history) = orchestrator(vec![0.5, 0.25]);
        let subject = SubjectId::session("s1");

        let started = engine.start_crash(&subject, Money::from_units(10)).await.unwrap();
        let round_id = started.round_id().unwrap().to_string();
        let settled = engine.abandon_round(&subject, &round_id).await.unwrap();
        let report = settled.report().unwrap();
        assert_eq!(report.outcome.payout, Money::ZERO);
        assert_eq!(report.wallet.balance, Money::from_units(990));
        assert!(!engine.active_rounds().is_active(&round_id));
        assert_eq!(history.recv().await.unwrap().result, GameOutcome::Loss);
    }

    #[tokio::test]
    async fn test_abandon_mines_forfeits_progress() {
        let (engine, _history) = orchestrator(vec![0.0; 3]);
        let subject = SubjectId::session("s1");

        let started = engine.start_mines(&subject, Money::from_units(10), 3).await.unwrap();
        let round_id = started.round_id().unwrap().to_string();
        engine.reveal_mine(&subject, &round_id, 10).await.unwrap();

        let settled = engine.abandon_round(&subject, &round_id).await.unwrap();
        assert_eq!(settled.report().unwrap().outcome.multiplier, Multiplier::ZERO);
        assert!(engine.abandon_round(&subject, &round_id).await.is_err());
    }

    #[tokio::test]
    async fn test_abandon_blackjack_stands() {
        // Player 2, 4 against dealer 3, 5; the dealer draws 6 and 7 to 21
        let (engine, _history) = orchestrator(vec![0.0; 51]);
        let subject = SubjectId::session("s1");

        let dealt = engine.deal_blackjack(&subject, Money::from_units(10)).await.unwrap();
        let round_id = dealt.round_id().unwrap().to_string();
        let settled = engine.abandon_round(&subject, &round_id).await.unwrap();
        let report = settled.report().unwrap();
        assert!(matches!(
            report.outcome.detail,
            ResultDetail::Blackjack {
                outcome: HandOutcome::DealerHigher,
                dealer_total: 21,
                ..
            }
        ));
        assert_eq!(report.outcome.payout, Money::ZERO);
    }

    #[tokio::test]
    async fn test_expire_rounds_by_age() {
        let (engine, _history) = orchestrator(vec![0.5, 0.5, 0.5, 0.5]);
        let a = SubjectId::session("a");
        let b = SubjectId::session("b");
        engine.start_crash(&a, Money::from_units(1)).await.unwrap();
        engine.start_crash(&b, Money::from_units(2)).await.unwrap();

        assert!(engine.expire_rounds(Duration::hours(1)).await.is_empty());
        assert_eq!(engine.active_rounds().active_count(), 2);

        let expired = engine.expire_rounds(Duration::zero()).await;
        assert_eq!(expired.len(), 2);
        assert_eq!(engine.active_rounds().active_count(), 0);
        assert_eq!(engine.monitor().rounds(), 2);
    }
}
