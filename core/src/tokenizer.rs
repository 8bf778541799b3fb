use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*|\p{N}+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","ain","all","am","an","and","any","are","aren","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","couldn","couldn't",
            "d","did","didn","didn't","do","does","doesn","doesn't","doing","don","don't","down","during",
            "each","few","for","from","further",
            "had","hadn","hadn't","has","hasn","hasn't","have","haven","haven't","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","isn","isn't","it","it's","its","itself",
            "just","ll","m","ma","me","mightn","mightn't","more","most","mustn","mustn't","my","myself",
            "needn","needn't","no","nor","not","now",
            "o","of","off","on","once","only","or","other","our","ours","ourselves","out","over","own",
            "re","s","same","shan","shan't","she","she's","should","should've","shouldn","shouldn't","so","some","such",
            "t","than","that","that'll","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","ve","very",
            "was","wasn","wasn't","we","were","weren","weren't","what","when","where","which","while","who","whom","why","will","with","won","won't","wouldn","wouldn't",
            "y","you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// Reduce a lowercased token to its base form, repeating the stemmer until it
/// stops changing so that base forms are stable under re-normalization.
pub fn base_form(token: &str) -> String {
    let mut current = token.to_string();
    loop {
        let next = STEMMER.stem(&current).trim().to_string();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Tokenize text using NFKC normalization, lowercase, stopword removal, and
/// base-form reduction. Surviving terms keep their original order.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    let mut tokens = Vec::new();
    for mat in RE.find_iter(&normalized) {
        let token = mat.as_str();
        if is_stopword(token) {
            continue;
        }
        let base = base_form(token);
        if base.is_empty() || is_stopword(&base) {
            continue;
        }
        tokens.push(base);
    }
    tokens
}

/// Normalize raw text into the space-joined token string that is fed to the
/// vectorizer. Documents and queries both go through here.
pub fn normalize(text: &str) -> String {
    tokenize(text).join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Running, runner's run!");
        assert!(t.iter().any(|w| w == "run"));
    }

    #[test]
    fn stopwords_are_dropped_in_order() {
        assert_eq!(tokenize("the boundary of the layer"), vec![base_form("boundary"), base_form("layer")]);
    }

    #[test]
    fn base_form_reaches_a_fixed_point() {
        for word in ["universaleeding", "generalizations", "organizational", "conditionally"] {
            let base = base_form(word);
            assert_eq!(base_form(&base), base, "word: {word}");
        }
    }

    #[test]
    fn punctuation_only_is_empty() {
        assert_eq!(normalize("... , ; -- !"), "");
    }

    #[test]
    fn normalize_is_stable() {
        let once = normalize("Experimental investigations of the aerodynamics of a wing in a slipstream.");
        assert_eq!(normalize(&once), once);
    }
}
