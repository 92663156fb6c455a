use crate::pipeline::traits::SentenceWeigher;

/// Scores letters by rough spoken length: vowels 3, other letters 1,
/// everything else 0. Accented Latin vowels (é, ü, å, ø, ...) count as
/// vowels. Digit runs are spelled out in English first.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterWeigher;

impl SentenceWeigher for CharacterWeigher {
    fn weigh(&self, sentence: &str) -> f64 {
        expand_numbers(sentence).chars().map(char_weight).sum()
    }
}

fn char_weight(c: char) -> f64 {
    if !c.is_alphabetic() {
        return 0.0;
    }
    if is_vowel(c) {
        3.0
    } else {
        1.0
    }
}

fn is_vowel(c: char) -> bool {
    c.to_lowercase().any(|lower| {
        matches!(
            lower,
            'a' | 'e' | 'i' | 'o' | 'u'
                | 'à'..='æ'
                | 'è'..='ï'
                | 'ò'..='ö'
                | 'ø'..='ü'
                | 'ā'..='ą'
                | 'ē'..='ě'
                | 'ĩ'..='ı'
                | 'ō'..='œ'
                | 'ũ'..='ų'
        )
    })
}

/// Replaces every run of ASCII digits with its English spelling.
pub fn expand_numbers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut digits = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        if !digits.is_empty() {
            out.push_str(&spell_digits(&digits));
            digits.clear();
        }
        out.push(c);
    }
    if !digits.is_empty() {
        out.push_str(&spell_digits(&digits));
    }
    out
}

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [&str; 7] = [
    "",
    "thousand",
    "million",
    "billion",
    "trillion",
    "quadrillion",
    "quintillion",
];

fn spell_digits(digits: &str) -> String {
    match digits.parse::<u64>() {
        Ok(n) => number_to_words(n),
        // Too long for a number word; read digit by digit.
        Err(_) => digits
            .bytes()
            .map(|b| ONES[(b - b'0') as usize])
            .collect::<Vec<_>>()
            .join(" "),
    }
}

pub fn number_to_words(n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }
    let mut groups = Vec::new();
    let mut rest = n;
    let mut scale = 0;
    while rest > 0 {
        let group = (rest % 1000) as usize;
        if group > 0 {
            let mut words = below_thousand(group);
            if !SCALES[scale].is_empty() {
                words.push(' ');
                words.push_str(SCALES[scale]);
            }
            groups.push(words);
        }
        rest /= 1000;
        scale += 1;
    }
    groups.reverse();
    groups.join(" ")
}

fn below_thousand(n: usize) -> String {
    let mut parts = Vec::new();
    if n >= 100 {
        parts.push(format!("{} hundred", ONES[n / 100]));
    }
    let rest = n % 100;
    if rest >= 20 {
        let tens = TENS[rest / 10];
        if rest % 10 == 0 {
            parts.push(tens.to_string());
        } else {
            parts.push(format!("{tens} {}", ONES[rest % 10]));
        }
    } else if rest > 0 {
        parts.push(ONES[rest].to_string());
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vowels_weigh_three() {
        assert_eq!(CharacterWeigher.weigh("aet"), 7.0);
        assert_eq!(CharacterWeigher.weigh("AET!"), 7.0);
        assert_eq!(CharacterWeigher.weigh("..., --"), 0.0);
    }

    #[test]
    fn accented_vowels_weigh_three() {
        assert_eq!(CharacterWeigher.weigh("été"), 7.0);
        assert_eq!(CharacterWeigher.weigh("Über"), 7.0);
        assert_eq!(CharacterWeigher.weigh("å ø œ ō"), 12.0);
        // ç, ñ and ß stay consonants
        assert_eq!(CharacterWeigher.weigh("çñß"), 3.0);
    }

    #[test]
    fn numbers_are_spelled_out() {
        assert_eq!(number_to_words(0), "zero");
        assert_eq!(number_to_words(15), "fifteen");
        assert_eq!(number_to_words(40), "forty");
        assert_eq!(number_to_words(123), "one hundred twenty three");
        assert_eq!(number_to_words(1_000_001), "one million one");
        assert_eq!(number_to_words(2_050_300), "two million fifty thousand three hundred");
    }

    #[test]
    fn digit_runs_in_text_are_expanded() {
        assert_eq!(expand_numbers("in 1984 and 7"), "in one thousand nine hundred eighty four and seven");
        assert_eq!(
            expand_numbers("99999999999999999999"),
            vec!["nine"; 20].join(" ")
        );
        // "two" = t, w, o
        assert_eq!(CharacterWeigher.weigh("2"), 5.0);
    }
}
