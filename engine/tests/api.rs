use rpg_engine::api::{simulate_skirmish, simulate_skirmish_many, winner_label, SkirmishConfig};
use rpg_engine::{CombatRules, Faction};

fn duel(seed: u64) -> SkirmishConfig {
    SkirmishConfig {
        seed,
        characters: vec!["John, Brave".into()],
        monsters: vec!["Ruthless Treasure-Gather".into()],
        ..Default::default()
    }
}

#[test]
fn skirmish_is_deterministic_per_seed() {
    let a = simulate_skirmish(duel(3)).unwrap();
    let b = simulate_skirmish(duel(3)).unwrap();
    assert_eq!(a.log, b.log);
    assert_eq!(a.winner, b.winner);
    assert_eq!(a.survivors, b.survivors);
}

#[test]
fn skirmish_reports_a_finished_battle() {
    let result = simulate_skirmish(SkirmishConfig { seed: 17, ..Default::default() }).unwrap();

    assert!(["characters", "monsters", "draw"].contains(&result.winner.as_str()));
    assert!(result.rounds >= 1 && result.rounds <= CombatRules::default().max_rounds);
    assert_eq!(result.log.first().map(String::as_str), Some("[ROUND] 1"));
    let end = result.log.last().unwrap();
    assert!(end.starts_with(&format!("[END] winner={}", result.winner)), "{end}");
    if result.winner != "draw" {
        assert!(!result.survivors.is_empty());
    }
}

#[test]
fn many_skirmishes_account_for_every_sample() {
    let stats = simulate_skirmish_many(duel(100), 25).unwrap();
    assert_eq!(stats.samples, 25);
    assert_eq!(stats.character_wins + stats.monster_wins + stats.draws, 25);
    assert!(stats.avg_rounds >= 1.0);
    assert!((0.0..=1.0).contains(&stats.character_win_rate()));

    let again = simulate_skirmish_many(duel(100), 25).unwrap();
    assert_eq!(again.character_wins, stats.character_wins);
}

#[test]
fn zero_samples_is_empty() {
    let stats = simulate_skirmish_many(duel(0), 0).unwrap();
    assert_eq!(stats.samples, 0);
    assert_eq!(stats.character_win_rate(), 0.0);
}

#[test]
fn sides_are_validated() {
    let missing = SkirmishConfig { characters: vec!["Nobody".into()], ..Default::default() };
    assert!(simulate_skirmish(missing).unwrap_err().to_string().contains("unit 'Nobody' not found"));

    let turncoat = SkirmishConfig { characters: vec!["Sniper".into()], ..Default::default() };
    assert!(simulate_skirmish(turncoat).unwrap_err().to_string().contains("is not a Character"));
}

#[test]
fn unknown_world_is_an_error() {
    let cfg = SkirmishConfig { world: Some("atlantis".into()), ..Default::default() };
    assert!(simulate_skirmish(cfg).is_err());

    let cfg = SkirmishConfig { world_path: Some("/definitely/not/here.yaml".into()), ..Default::default() };
    assert!(simulate_skirmish(cfg).unwrap_err().to_string().contains("failed to read world file"));
}

#[test]
fn config_reads_from_json() {
    let cfg: SkirmishConfig =
        serde_json::from_str(r#"{ "seed": 9, "characters": ["Alice"], "rules": { "max_rounds": 5 } }"#).unwrap();
    assert_eq!(cfg.rules.max_rounds, 5);
    assert_eq!(cfg.rules.fly_evasion, 20);
    let result = simulate_skirmish(cfg).unwrap();
    assert!(result.rounds <= 5);
}

#[test]
fn winner_labels() {
    assert_eq!(winner_label(Some(Faction::Character)), "characters");
    assert_eq!(winner_label(Some(Faction::Monster)), "monsters");
    assert_eq!(winner_label(None), "draw");
}
