//! Porter suffix stripping.
//!
//! Works on lowercase ASCII words; anything else is returned untouched so
//! that non-English tokens still reach the vocabulary intact.

const STEP2_RULES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("abli", "able"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
];

const STEP3_RULES: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

const STEP4_SUFFIXES: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion",
    "ou", "ism", "ate", "iti", "ous", "ive", "ize",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer;

impl PorterStemmer {
    pub fn new() -> Self {
        PorterStemmer
    }

    /// Reduce `word` to its stem.
    ///
    /// # Examples
    /// ```
    /// use nb_feature_classifier::text::stem::PorterStemmer;
    ///
    /// let stemmer = PorterStemmer::new();
    /// assert_eq!(stemmer.stem("running"), "run");
    /// assert_eq!(stemmer.stem("today"), "todai");
    /// ```
    pub fn stem(&self, word: &str) -> String {
        if word.len() <= 2 || !word.bytes().all(|b| b.is_ascii_lowercase()) {
            return word.to_string();
        }
        let mut w = word.as_bytes().to_vec();
        step1a(&mut w);
        step1b(&mut w);
        step1c(&mut w);
        replace_longest(&mut w, STEP2_RULES, 0);
        replace_longest(&mut w, STEP3_RULES, 0);
        step4(&mut w);
        step5(&mut w);
        // only ASCII bytes were ever written
        String::from_utf8(w).unwrap_or_else(|_| word.to_string())
    }
}

/// `y` counts as a consonant only at the start or after a vowel.
fn is_consonant(w: &[u8], i: usize) -> bool {
    match w[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_consonant(w, i - 1),
        _ => true,
    }
}

/// Number of vowel-consonant sequences, the `m` of [C](VC)^m[V].
fn measure(w: &[u8]) -> usize {
    let mut m = 0;
    let mut prev_vowel = false;
    for i in 0..w.len() {
        let consonant = is_consonant(w, i);
        if consonant && prev_vowel {
            m += 1;
        }
        prev_vowel = !consonant;
    }
    m
}

fn has_vowel(w: &[u8]) -> bool {
    (0..w.len()).any(|i| !is_consonant(w, i))
}

fn ends_double_consonant(w: &[u8]) -> bool {
    let n = w.len();
    n >= 2 && w[n - 1] == w[n - 2] && is_consonant(w, n - 1)
}

/// consonant-vowel-consonant ending, last one not w, x or y
fn ends_cvc(w: &[u8]) -> bool {
    let n = w.len();
    n >= 3
        && is_consonant(w, n - 3)
        && !is_consonant(w, n - 2)
        && is_consonant(w, n - 1)
        && !matches!(w[n - 1], b'w' | b'x' | b'y')
}

#[inline]
fn stem_len(w: &[u8], suffix: &str) -> Option<usize> {
    w.ends_with(suffix.as_bytes()).then(|| w.len() - suffix.len())
}

fn replace_tail(w: &mut Vec<u8>, keep: usize, replacement: &str) {
    w.truncate(keep);
    w.extend_from_slice(replacement.as_bytes());
}

fn step1a(w: &mut Vec<u8>) {
    if let Some(keep) = stem_len(w, "sses") {
        replace_tail(w, keep, "ss");
    } else if let Some(keep) = stem_len(w, "ies") {
        replace_tail(w, keep, "i");
    } else if w.ends_with(b"ss") {
    } else if w.ends_with(b"s") {
        w.pop();
    }
}

fn step1b(w: &mut Vec<u8>) {
    if let Some(keep) = stem_len(w, "eed") {
        if measure(&w[..keep]) > 0 {
            w.pop();
        }
        return;
    }
    let stripped = ["ed", "ing"]
        .iter()
        .find_map(|suffix| stem_len(w, suffix).filter(|&keep| has_vowel(&w[..keep])));
    let Some(keep) = stripped else {
        return;
    };
    w.truncate(keep);
    if w.ends_with(b"at") || w.ends_with(b"bl") || w.ends_with(b"iz") {
        w.push(b'e');
    } else if ends_double_consonant(w) && !matches!(w[w.len() - 1], b'l' | b's' | b'z') {
        w.pop();
    } else if measure(w) == 1 && ends_cvc(w) {
        w.push(b'e');
    }
}

fn step1c(w: &mut Vec<u8>) {
    if let Some(keep) = stem_len(w, "y") {
        if has_vowel(&w[..keep]) {
            replace_tail(w, keep, "i");
        }
    }
}

/// Apply the rule with the longest matching suffix, if its stem measure exceeds `min_measure`.
fn replace_longest(w: &mut Vec<u8>, rules: &[(&str, &str)], min_measure: usize) {
    let best = rules
        .iter()
        .filter(|(suffix, _)| w.ends_with(suffix.as_bytes()))
        .max_by_key(|(suffix, _)| suffix.len());
    if let Some((suffix, replacement)) = best {
        let keep = w.len() - suffix.len();
        if measure(&w[..keep]) > min_measure {
            replace_tail(w, keep, replacement);
        }
    }
}

fn step4(w: &mut Vec<u8>) {
    let best = STEP4_SUFFIXES
        .iter()
        .filter(|suffix| w.ends_with(suffix.as_bytes()))
        .max_by_key(|suffix| suffix.len());
    let Some(suffix) = best else {
        return;
    };
    let keep = w.len() - suffix.len();
    if measure(&w[..keep]) <= 1 {
        return;
    }
    if *suffix == "ion" && !(keep > 0 && matches!(w[keep - 1], b's' | b't')) {
        return;
    }
    w.truncate(keep);
}

fn step5(w: &mut Vec<u8>) {
    if let Some(keep) = stem_len(w, "e") {
        let m = measure(&w[..keep]);
        if m > 1 || (m == 1 && !ends_cvc(&w[..keep])) {
            w.truncate(keep);
        }
    }
    if w.ends_with(b"ll") && measure(w) > 1 {
        w.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stem(word: &str) -> String {
        PorterStemmer::new().stem(word)
    }

    #[test]
    fn plurals() {
        assert_eq!(stem("caresses"), "caress");
        assert_eq!(stem("ponies"), "poni");
        assert_eq!(stem("cats"), "cat");
        assert_eq!(stem("games"), "game");
    }

    #[test]
    fn ed_and_ing() {
        assert_eq!(stem("running"), "run");
        assert_eq!(stem("jumped"), "jump");
        assert_eq!(stem("hopping"), "hop");
        assert_eq!(stem("filing"), "file");
        assert_eq!(stem("agreed"), "agre");
        assert_eq!(stem("sing"), "sing");
    }

    #[test]
    fn derivational_suffixes() {
        assert_eq!(stem("relational"), "relat");
        assert_eq!(stem("happiness"), "happi");
        assert_eq!(stem("adoption"), "adopt");
        assert_eq!(stem("controll"), "control");
    }

    #[test]
    fn short_and_non_ascii_words_pass_through() {
        assert_eq!(stem("is"), "is");
        assert_eq!(stem("team"), "team");
        assert_eq!(stem("won"), "won");
        assert_eq!(stem("rose"), "rose");
        assert_eq!(stem("market"), "market");
        assert_eq!(stem("café"), "café");
        assert_eq!(stem("Rust"), "Rust");
    }
}
