//! Outcome generator properties, checked through the public game API

use wager_engine::{
    config::EngineConfig,
    games::{
        blackjack::settle_hands,
        crash::{CrashPoint, CrashRound, CrashSetup},
        mines::mines_multiplier,
        resolve,
        roulette::payout_multiplier,
        threshold::DiceBet,
        types::{Card, DiceDirection, HandOutcome, RiskLevel, RouletteBet, Suit},
        GameRules,
    },
    GameParams, Money, Multiplier, ResultDetail, ScriptedDraws, StdDraws, SubjectId, WagerRequest,
};

fn rules() -> GameRules {
    GameRules::new(&EngineConfig::default()).unwrap()
}

fn request(params: GameParams) -> WagerRequest {
    WagerRequest::new(SubjectId::session("props"), Money::from_units(1), params)
}

#[test]
fn test_dice_even_chance_pays_198() {
    let bet = DiceBet::new(50.0, DiceDirection::Over, &rules()).unwrap();
    assert_eq!(bet.win_chance(), 50.0);
    assert_eq!(bet.multiplier(), Multiplier::from_hundredths(198));
}

#[test]
fn test_dice_never_favours_the_player() {
    let rules = rules();
    for k in 1..=9_800u32 {
        let target = k as f64 / 100.0;
        let bet = DiceBet::new(target, DiceDirection::Under, &rules).unwrap();
        let expected_return = bet.multiplier().as_f64() * bet.win_chance();
        assert!(
            expected_return <= 100.0 + 1e-9,
            "target {} returns {}",
            target,
            expected_return
        );
    }
}

#[test]
fn test_mines_multiplier_curve() {
    assert_eq!(mines_multiplier(25, 5, 0, 0.01), Multiplier::ONE);

    let mut last = Multiplier::ONE;
    for k in 1..=20 {
        let m = mines_multiplier(25, 5, k, 0.01);
        assert!(m > last, "k={} gave {} after {}", k, m, last);
        last = m;
    }
    assert_eq!(mines_multiplier(25, 5, 21, 0.01), Multiplier::ZERO);
}

#[test]
fn test_keno_full_match_and_missing_entries() {
    let rules = rules();
    let table = rules.keno();
    assert_eq!(table.lookup(10, 10), Multiplier::from_whole(10_000));
    assert_eq!(table.lookup(3, 7), Multiplier::ZERO);
    assert_eq!(table.lookup(0, 0), Multiplier::ZERO);
    assert_eq!(table.lookup(11, 1), Multiplier::ZERO);

    // All-zero draws take the first ten numbers of the pool
    let picks: Vec<u32> = (1..=10).collect();
    let mut draws = ScriptedDraws::new(vec![0.0; 10]);
    let outcome = resolve(&request(GameParams::Keno { picks }), &rules, &mut draws).unwrap();
    assert_eq!(outcome.multiplier, Multiplier::from_whole(10_000));
    assert_eq!(outcome.payout, Money::from_units(10_000));
}

#[test]
fn test_roulette_reference_bets() {
    // 2 is black
    assert_eq!(payout_multiplier(&RouletteBet::Red, 2), Multiplier::ZERO);
    assert_eq!(payout_multiplier(&RouletteBet::Straight(17), 17), Multiplier::from_whole(35));
    assert_eq!(payout_multiplier(&RouletteBet::Black, 0), Multiplier::ZERO);
}

#[test]
fn test_blackjack_reference_hands() {
    let natural = [Card::new(1, Suit::Spades), Card::new(13, Suit::Hearts)];
    let dealer = [Card::new(9, Suit::Clubs), Card::new(8, Suit::Diamonds)];
    assert_eq!(
        settle_hands(&natural, &dealer),
        (HandOutcome::PlayerBlackjack, Multiplier::from_hundredths(250))
    );

    let bust = [
        Card::new(13, Suit::Spades),
        Card::new(12, Suit::Hearts),
        Card::new(5, Suit::Clubs),
    ];
    assert_eq!(settle_hands(&bust, &dealer), (HandOutcome::PlayerBust, Multiplier::ZERO));
}

#[test]
fn test_crash_instant_bust_loses_every_cash_out() {
    let setup = CrashSetup::from_rules(&rules());
    let point = CrashPoint {
        multiplier: Multiplier::ONE,
        instant_bust: true,
    };

    for tick in [0, 1, 10, 500] {
        let mut round = CrashRound::with_point(setup, point);
        assert_eq!(round.cash_out(tick).unwrap(), Multiplier::ZERO);
        assert_eq!(round.final_multiplier(), Multiplier::ZERO);
    }
}

#[test]
fn test_crash_instant_bust_through_resolve() {
    let rules = rules();
    let mut draws = ScriptedDraws::new([0.01]);
    let outcome = resolve(&request(GameParams::Crash { auto_cash_out: 1.01 }), &rules, &mut draws).unwrap();
    assert!(outcome.is_loss());
    assert!(matches!(outcome.detail, ResultDetail::Crash { instant_bust: true, .. }));
}

#[test]
fn test_validation_rejects_before_drawing() {
    let rules = rules();
    let mut draws = ScriptedDraws::new([0.5]);

    let bad = [
        GameParams::Dice {
            target: 100.0,
            direction: DiceDirection::Under,
        },
        GameParams::Limbo { target: 1.0 },
        GameParams::Roulette {
            bet: RouletteBet::Straight(37),
        },
        GameParams::Keno { picks: vec![1, 1] },
        GameParams::Mines {
            mines: 25,
            reveals: vec![0],
        },
        GameParams::Plinko {
            rows: 9,
            risk: RiskLevel::Low,
        },
        GameParams::Blackjack { stand_on: 22 },
    ];
    for params in bad {
        let err = resolve(&request(params.clone()), &rules, &mut draws).unwrap_err();
        assert!(err.is_validation(), "{:?} gave {}", params, err);
    }
    assert_eq!(draws.consumed(), 0);

    let tiny = WagerRequest::new(SubjectId::session("props"), Money::from_cents(1), GameParams::Slots);
    assert!(resolve(&tiny, &rules, &mut draws).unwrap_err().is_validation());
}

/// Observed return over many seeded rounds
fn observed_rtp(params: GameParams, rounds: u32, seed: u64) -> f64 {
    let rules = rules();
    let mut rng = StdDraws::seeded(seed);
    let req = request(params);
    let mut returned = 0u64;
    for _ in 0..rounds {
        returned += resolve(&req, &rules, &mut rng).unwrap().payout.cents();
    }
    returned as f64 / (rounds as u64 * req.bet_amount.cents()) as f64
}

#[test]
fn test_dice_long_run_rtp() {
    let rtp = observed_rtp(
        GameParams::Dice {
            target: 50.0,
            direction: DiceDirection::Over,
        },
        200_000,
        7,
    );
    assert!((rtp - 0.99).abs() < 0.015, "dice rtp {}", rtp);
}

#[test]
fn test_roulette_long_run_rtp() {
    let rtp = observed_rtp(GameParams::Roulette { bet: RouletteBet::Red }, 200_000, 11);
    assert!((rtp - 36.0 / 37.0).abs() < 0.015, "roulette rtp {}", rtp);
}

#[test]
fn test_plinko_long_run_rtp() {
    let rtp = observed_rtp(
        GameParams::Plinko {
            rows: 8,
            risk: RiskLevel::Low,
        },
        200_000,
        13,
    );
    assert!((rtp - 0.99).abs() < 0.02, "plinko rtp {}", rtp);
}
