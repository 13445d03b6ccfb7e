use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};

lazy_static! {
    /// Suffixes stripped during normalization, checked longest-first. The
    /// single-character entries double as trailing-punctuation removal.
    static ref SUFFIXES: HashSet<&'static str> = {
        let entries: &[&str] = &[
            // 1 char
            "s", "y", "d", "e", ",", "+", "!", "?", ".", ":", ";", "-", "_",
            "(", ")", "[", "]", "{", "}", "'", "\"",
            // 2 chars
            "es", "ly", "ed", "ic", "al", "er", "or", "ar", "en",
            // 3 chars
            "ing", "ily", "ion", "ful", "ism", "ous", "ify", "ize", "ise",
            "ist", "ate", "ant", "ent", "pod", "ish",
            // 4 chars
            "able", "ible", "ment", "less", "tion", "ness", "book", "ship",
            "ward", "wise", "hood", "some", "like", "ance", "ence",
            // 5 chars
            "ation", "ition", "lling",
        ];
        entries.iter().copied().collect()
    };

    /// Commonly mistyped letters on a QWERTY keyboard, or letters that are
    /// often confused.
    static ref TYPO_NEIGHBORS: HashMap<char, Vec<char>> = {
        let pairs: &[(char, &[char])] = &[
            ('t', &['g', 'r', 'y', 'h']),
            ('o', &['n', 'i', 'p', 'u', 'e']),
            ('a', &['s', 'q', 'w', 'r', 'o', 'e', 'u']),
            ('s', &['a', 'd', 'z']),
            ('e', &['w', 'r', 'd', 'o']),
            ('i', &['o', 'u', 'y', 't', 'e']),
            ('u', &['i', 'o', 'y', 'a']),
            ('r', &['t', 'e', 'f']),
            ('n', &['m', 'h', 'b']),
            ('l', &['k', 'o', 'i']),
            ('c', &['x', 'v', 'z', 'f']),
            ('h', &['g', 'j', 'k', 'e']),
            ('d', &['s', 'f', 'e']),
            ('y', &['u', 'i', 'o']),
            ('g', &['h', 'j', 'f', 't']),
            ('b', &['n', 'm', 'v', 'h']),
            ('q', &['w', 'e', 'a']),
            ('`', &['q', 'w', 'e', 'z', 'a']),
            ('k', &['j', 'l', 'o', 'i']),
            (',', &['m']),
            (';', &['l']),
        ];
        pairs.iter().map(|&(c, ns)| (c, ns.to_vec())).collect()
    };

    /// Letters tried for dropped-keystroke repair: the alphabetic keys of the
    /// adjacency table, since a commonly mistyped letter is also the one most
    /// commonly omitted.
    static ref TYPO_INSERT_LETTERS: Vec<char> = {
        let mut letters: Vec<char> = TYPO_NEIGHBORS
            .keys()
            .copied()
            .filter(char::is_ascii_alphabetic)
            .collect();
        letters.sort_unstable();
        letters
    };
}

/// One normalized token. `variant_of` is `None` for a genuine word and
/// `Some(term)` for a typo-generated variant standing in for that term.
/// `position` indexes into [`TokenStream::words`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub term: String,
    pub position: usize,
    pub variant_of: Option<String>,
}

/// Tokenizer output: the original words in position order plus the token
/// list. Genuine tokens keep their multiplicity so indexing can count term
/// frequencies; query-side consumers dedupe.
#[derive(Debug, Default)]
pub struct TokenStream {
    pub words: Vec<String>,
    pub tokens: Vec<Token>,
}

impl TokenStream {
    /// Term frequencies over the genuine tokens.
    pub fn term_frequencies(&self) -> HashMap<String, u32> {
        let mut frequencies = HashMap::new();
        for token in self.tokens.iter().filter(|t| t.variant_of.is_none()) {
            *frequencies.entry(token.term.clone()).or_insert(0) += 1;
        }
        frequencies
    }
}

/// Tokenize free text: lower-case, split on single spaces and hyphens, strip
/// one suffix per word from the fixed table. With `typo_mitigation` each
/// genuine word also yields its typo-neighbor variants; indexing passes
/// `false`, query parsing passes `true`.
pub fn tokenize(text: &str, typo_mitigation: bool) -> TokenStream {
    let mut stream = TokenStream::default();
    let lowered = text.to_lowercase();
    for raw in lowered.split(' ') {
        for word in raw.split('-') {
            if word.is_empty() {
                continue;
            }
            let position = stream.words.len();
            let term = strip_suffix(word);
            stream.words.push(word.to_string());
            if typo_mitigation {
                for variant in typo_variants(&term) {
                    stream.tokens.push(Token {
                        term: variant,
                        position,
                        variant_of: Some(term.clone()),
                    });
                }
            }
            stream.tokens.push(Token {
                term,
                position,
                variant_of: None,
            });
        }
    }
    stream
}

/// Strip the longest matching suffix from words longer than 3 characters.
/// Already-stripped words pass through unchanged.
fn strip_suffix(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() > 3 {
        for take in (1..=5).rev() {
            if chars.len() <= take {
                continue;
            }
            let tail: String = chars[chars.len() - take..].iter().collect();
            if SUFFIXES.contains(tail.as_str()) {
                return chars[..chars.len() - take].iter().collect();
            }
        }
    }
    word.to_string()
}

/// Alternate spellings of a term: one substitution per adjacent letter at
/// each position, plus one insertion per commonly-dropped letter at each gap.
fn typo_variants(term: &str) -> Vec<String> {
    let chars: Vec<char> = term.chars().collect();
    let mut variants = HashSet::new();
    for (i, ch) in chars.iter().enumerate() {
        if let Some(neighbors) = TYPO_NEIGHBORS.get(ch) {
            for &neighbor in neighbors {
                let mut candidate = chars.clone();
                candidate[i] = neighbor;
                variants.insert(candidate.iter().collect::<String>());
            }
        }
    }
    for gap in 0..=chars.len() {
        for &letter in TYPO_INSERT_LETTERS.iter() {
            let mut candidate = chars.clone();
            candidate.insert(gap, letter);
            variants.insert(candidate.iter().collect::<String>());
        }
    }
    variants.remove(term);
    let mut variants: Vec<String> = variants.into_iter().collect();
    variants.sort_unstable();
    variants
}
