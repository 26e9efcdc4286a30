//! Shared fixtures: a four-by-four board with orthogonal group embeddings.

#![allow(dead_code)]

use std::sync::Arc;

use connections_oracle::{ScriptedHypothesisOracle, TableEmbeddingOracle};
use connections_solver::RsaSolver;
use connections_types::{Board, CategoryHypothesis, SolverConfig, Word};

pub const GROUPS: [(&str, [&str; 4]); 4] = [
    ("WET WEATHER", ["HAIL", "RAIN", "SLEET", "SNOW"]),
    ("NBA TEAMS", ["BUCKS", "HEAT", "JAZZ", "NETS"]),
    ("KEYBOARD KEYS", ["OPTION", "RETURN", "SHIFT", "TAB"]),
    ("PALINDROMES", ["KAYAK", "LEVEL", "MOM", "RACECAR"]),
];

pub const PUZZLE_JSON: &str = r#"{
    "id": 1,
    "answers": [
        {"level": 0, "group": "WET WEATHER", "members": ["HAIL", "RAIN", "SLEET", "SNOW"]},
        {"level": 1, "group": "NBA TEAMS", "members": ["BUCKS", "HEAT", "JAZZ", "NETS"]},
        {"level": 2, "group": "KEYBOARD KEYS", "members": ["OPTION", "RETURN", "SHIFT", "TAB"]},
        {"level": 3, "group": "PALINDROMES", "members": ["KAYAK", "LEVEL", "MOM", "RACECAR"]}
    ]
}"#;

pub fn board() -> Board {
    let mut words: Vec<&str> = GROUPS.iter().flat_map(|(_, w)| w.iter().copied()).collect();
    words.sort_unstable();
    Board::standard(words).unwrap()
}

pub fn truth() -> Vec<CategoryHypothesis> {
    GROUPS
        .iter()
        .map(|(label, words)| CategoryHypothesis::new(*label, *words))
        .collect()
}

/// Plausible but wrong groups; neither fits into a complete cover.
pub fn decoys() -> Vec<CategoryHypothesis> {
    vec![
        CategoryHypothesis::new("COLD THINGS", ["HAIL", "RAIN", "SLEET", "BUCKS"]),
        CategoryHypothesis::new("SHIFTING WEATHER", ["RAIN", "SLEET", "SNOW", "OPTION"]),
    ]
}

pub fn truth_and_decoys() -> Vec<CategoryHypothesis> {
    let mut all = truth();
    all.extend(decoys());
    all
}

fn basis(i: usize) -> Vec<f32> {
    let mut v = vec![0.0; 4];
    v[i] = 1.0;
    v
}

/// Group `i`'s words and label embed to basis vector `i`; decoy labels sit
/// halfway between two groups.
pub fn embedding_table() -> TableEmbeddingOracle {
    let mut table = TableEmbeddingOracle::new();
    for (i, (label, words)) in GROUPS.iter().enumerate() {
        table.insert(label, basis(i));
        for word in words {
            table.insert(word, basis(i));
        }
    }
    let half = std::f32::consts::FRAC_1_SQRT_2;
    table.insert("COLD THINGS", vec![half, half, 0.0, 0.0]);
    table.insert("SHIFTING WEATHER", vec![half, 0.0, half, 0.0]);
    table
}

pub fn embeddings() -> Arc<TableEmbeddingOracle> {
    Arc::new(embedding_table())
}

pub fn solver(oracle: Arc<ScriptedHypothesisOracle>, config: SolverConfig) -> RsaSolver {
    RsaSolver::new(oracle, embeddings(), config).unwrap()
}

pub fn sorted_groups(groups: &[(&str, [&str; 4])]) -> Vec<Vec<Word>> {
    let mut sets: Vec<Vec<Word>> = groups
        .iter()
        .map(|(_, words)| {
            let mut set: Vec<Word> = words.iter().map(Word::new).collect();
            set.sort();
            set
        })
        .collect();
    sets.sort();
    sets
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
