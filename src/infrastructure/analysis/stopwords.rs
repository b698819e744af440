//! English stopword list

use std::collections::HashSet;

use once_cell::sync::Lazy;

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // Articles and pronouns
        "a", "an", "the", "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you",
        "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself", "she", "her",
        "hers", "herself", "it", "its", "itself", "they", "them", "their", "theirs",
        "themselves", "what", "which", "who", "whom", "this", "that", "these", "those",
        // Auxiliaries and modals
        "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
        "having", "do", "does", "did", "doing", "would", "should", "could", "ought", "might",
        "must", "shall", "will", "can", "may",
        // Prepositions
        "at", "by", "for", "from", "in", "into", "of", "on", "to", "with", "about", "against",
        "between", "during", "before", "after", "above", "below", "up", "down", "out", "off",
        "over", "under", "through", "again", "further", "then", "once", "within", "without",
        "upon", "via", "per", "among", "across",
        // Conjunctions
        "and", "but", "or", "nor", "so", "yet", "both", "either", "neither", "not", "only",
        "than", "when", "where", "while", "if", "because", "as", "until", "although",
        "however", "therefore", "thus", "whether",
        // Other common words
        "here", "there", "all", "each", "few", "more", "most", "other", "some", "such", "no",
        "any", "own", "same", "too", "very", "just", "also", "now", "how", "why", "well",
        "s", "t", "don", "should've", "ll", "re", "ve", "d", "m", "o", "y", "ain", "aren",
        "couldn", "didn", "doesn", "hadn", "hasn", "haven", "isn", "ma", "mightn", "mustn",
        "needn", "shan", "shouldn", "wasn", "weren", "won", "wouldn",
    ]
    .into_iter()
    .collect()
});

/// Whether a lowercased token is a stopword
pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}
