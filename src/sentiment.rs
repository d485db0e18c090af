use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::models::Dataset;

/// Tokens a negation reaches forward ("not really that good").
const NEGATION_WINDOW: usize = 3;
/// Pattern-style dampening: "not good" is mildly negative, not the mirror of "good".
const NEGATION_FACTOR: f64 = -0.5;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+(?:['’][\p{L}]+)?").expect("static regex"));

/// Word polarity in [-1, 1]. Adjective-heavy, tuned for short video titles.
static LEXICON: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    [
        // positive
        ("good", 0.7),
        ("great", 0.8),
        ("best", 1.0),
        ("better", 0.5),
        ("amazing", 0.6),
        ("awesome", 1.0),
        ("incredible", 0.9),
        ("insane", 0.5),
        ("epic", 0.5),
        ("beautiful", 0.85),
        ("perfect", 1.0),
        ("excellent", 1.0),
        ("wonderful", 1.0),
        ("fantastic", 0.4),
        ("brilliant", 0.9),
        ("cool", 0.35),
        ("nice", 0.6),
        ("fun", 0.3),
        ("funny", 0.25),
        ("hilarious", 0.5),
        ("happy", 0.8),
        ("love", 0.5),
        ("lovely", 0.5),
        ("loved", 0.7),
        ("cute", 0.5),
        ("sweet", 0.35),
        ("win", 0.8),
        ("wins", 0.8),
        ("winning", 0.5),
        ("victory", 0.6),
        ("success", 0.3),
        ("successful", 0.75),
        ("legendary", 0.6),
        ("iconic", 0.4),
        ("top", 0.5),
        ("new", 0.136),
        ("first", 0.25),
        ("full", 0.35),
        ("live", 0.136),
        ("official", 0.1),
        ("real", 0.2),
        ("true", 0.35),
        ("free", 0.4),
        ("easy", 0.43),
        ("fresh", 0.3),
        ("special", 0.36),
        ("exclusive", 0.2),
        ("ultimate", 0.3),
        ("glorious", 0.8),
        ("magical", 0.5),
        ("stunning", 0.5),
        ("wow", 0.1),
        ("proud", 0.8),
        ("excited", 0.375),
        ("exciting", 0.3),
        ("satisfying", 0.5),
        ("delicious", 1.0),
        ("favorite", 0.5),
        ("favourite", 0.5),
        ("smart", 0.21),
        ("strong", 0.43),
        ("powerful", 0.3),
        ("peaceful", 0.25),
        ("safe", 0.5),
        ("rich", 0.375),
        ("lucky", 0.33),
        ("wholesome", 0.5),
        ("clean", 0.37),
        ("positive", 0.23),
        ("celebrate", 0.4),
        ("celebration", 0.4),
        // negative
        ("bad", -0.7),
        ("worst", -1.0),
        ("worse", -0.4),
        ("terrible", -1.0),
        ("horrible", -1.0),
        ("awful", -1.0),
        ("sad", -0.5),
        ("angry", -0.5),
        ("hate", -0.8),
        ("ugly", -0.7),
        ("stupid", -0.8),
        ("dumb", -0.375),
        ("boring", -1.0),
        ("crazy", -0.6),
        ("scary", -0.5),
        ("creepy", -0.5),
        ("dead", -0.2),
        ("death", -0.3),
        ("dies", -0.3),
        ("died", -0.3),
        ("kill", -0.5),
        ("killed", -0.5),
        ("murder", -0.6),
        ("war", -0.4),
        ("attack", -0.4),
        ("crash", -0.5),
        ("disaster", -0.6),
        ("tragic", -0.75),
        ("tragedy", -0.7),
        ("shocking", -1.0),
        ("shocked", -0.7),
        ("fail", -0.5),
        ("failed", -0.5),
        ("lose", -0.4),
        ("lost", -0.3),
        ("loses", -0.4),
        ("broken", -0.4),
        ("wrong", -0.5),
        ("fake", -0.5),
        ("poor", -0.4),
        ("weak", -0.375),
        ("hard", -0.29),
        ("difficult", -0.5),
        ("dangerous", -0.6),
        ("danger", -0.5),
        ("worried", -0.3),
        ("fear", -0.4),
        ("cry", -0.3),
        ("crying", -0.3),
        ("pain", -0.4),
        ("painful", -0.7),
        ("sick", -0.71),
        ("evil", -1.0),
        ("dark", -0.15),
        ("cringe", -0.6),
        ("disgusting", -1.0),
        ("rude", -0.3),
        ("mad", -0.625),
        ("toxic", -0.5),
        ("negative", -0.3),
        ("problem", -0.2),
        ("crisis", -0.5),
        ("scam", -0.7),
        ("banned", -0.3),
        ("nightmare", -0.6),
        ("wasted", -0.2),
        ("lonely", -0.25),
        ("fight", -0.2),
    ]
    .into_iter()
    .collect()
});

/// Multipliers applied to the next sentiment-bearing word.
static INTENSIFIERS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    [
        ("very", 1.3),
        ("really", 1.3),
        ("so", 1.3),
        ("too", 1.2),
        ("super", 1.3),
        ("extremely", 1.5),
        ("absolutely", 1.5),
        ("totally", 1.3),
        ("incredibly", 1.4),
        ("most", 1.2),
        ("ever", 1.1),
        ("highly", 1.3),
        ("truly", 1.2),
        ("completely", 1.4),
    ]
    .into_iter()
    .collect()
});

static NEGATIONS: [&str; 8] = ["not", "no", "never", "nothing", "none", "nobody", "without", "cannot"];

fn is_negation(token: &str) -> bool {
    NEGATIONS.contains(&token) || token.ends_with("n't") || token.ends_with("n’t")
}

fn tokens(text: &str) -> Vec<String> {
    let normalized: String = text.nfc().collect::<String>().to_lowercase();
    TOKEN_RE.find_iter(&normalized).map(|m| m.as_str().to_string()).collect()
}

/// Polarity of `text` in [-1.0, 1.0].
///
/// Mean of the scored words; text with no lexicon hits (including empty text)
/// is exactly 0.0.
pub fn title_sentiment(text: &str) -> f64 {
    let mut scores: Vec<f64> = Vec::new();
    let mut intensity = 1.0;
    let mut negation_left = 0usize;

    for tok in tokens(text) {
        if is_negation(&tok) {
            negation_left = NEGATION_WINDOW;
            intensity = 1.0;
            continue;
        }
        if let Some(&factor) = INTENSIFIERS.get(tok.as_str()) {
            intensity *= factor;
            continue;
        }
        match LEXICON.get(tok.as_str()) {
            Some(&polarity) => {
                let mut score = polarity * intensity;
                if negation_left > 0 {
                    score *= NEGATION_FACTOR;
                }
                scores.push(score.clamp(-1.0, 1.0));
                intensity = 1.0;
                negation_left = 0;
            }
            None => {
                intensity = 1.0;
                negation_left = negation_left.saturating_sub(1);
            }
        }
    }

    if scores.is_empty() {
        return 0.0;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    mean.clamp(-1.0, 1.0)
}

/// Fill `title_sentiment` for every row.
pub fn score_titles(dataset: &mut Dataset) {
    for r in dataset.iter_mut() {
        r.title_sentiment = title_sentiment(&r.title);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_neutral_text_is_zero() {
        assert_eq!(title_sentiment(""), 0.0);
        assert_eq!(title_sentiment("Episode 12 | Season 3"), 0.0);
        assert_eq!(title_sentiment("😀😀😀 !!!"), 0.0);
    }

    #[test]
    fn polarity_direction() {
        assert!(title_sentiment("The best day ever, what an amazing trip") > 0.0);
        assert!(title_sentiment("The worst and most horrible crash") < 0.0);
    }

    #[test]
    fn averages_scored_words() {
        // good 0.7, bad -0.7
        assert!((title_sentiment("good and bad") - 0.0).abs() < 1e-12);
        assert!((title_sentiment("GOOD") - 0.7).abs() < 1e-12);
    }

    #[test]
    fn intensifier_scales_next_word_only() {
        assert!((title_sentiment("very good") - 0.91).abs() < 1e-9);
        assert!((title_sentiment("very ordinary good") - 0.7).abs() < 1e-9);
        assert_eq!(title_sentiment("extremely perfect"), 1.0);
    }

    #[test]
    fn negation_flips_and_dampens() {
        assert!((title_sentiment("not good") - (-0.35)).abs() < 1e-9);
        assert!((title_sentiment("this isn't bad") - 0.35).abs() < 1e-9);
        // out of reach after the window
        assert!((title_sentiment("not one two three four good") - 0.7).abs() < 1e-9);
    }

    #[test]
    fn always_within_bounds_and_deterministic() {
        let titles = [
            "Absolutely incredibly extremely best best best",
            "worst worst worst terrible evil disgusting",
            "Official Trailer (2025) - New Movie",
            "Não é bom? ¿Qué pasa?",
        ];
        for t in titles {
            let s = title_sentiment(t);
            assert!((-1.0..=1.0).contains(&s), "{t} -> {s}");
            assert_eq!(s, title_sentiment(t));
        }
    }
}
