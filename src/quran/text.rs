//! Arabic text helpers: digit conversion, search normalization, and cleanup
//! of translation markup returned by the API.

const ARABIC_ZERO: u32 = 0x0660;

/// Replaces ASCII digits with Eastern Arabic digits. Everything else stays
/// where it was.
pub fn to_arabic_numerals(s: &str) -> String {
    s.chars()
        .map(|c| match c.to_digit(10) {
            Some(d) if c.is_ascii_digit() => char::from_u32(ARABIC_ZERO + d).unwrap_or(c),
            _ => c,
        })
        .collect()
}

/// Harakat, Quranic annotation marks, superscript alef and tatweel.
fn is_strippable(c: char) -> bool {
    matches!(c,
        '\u{0610}'..='\u{061A}'
        | '\u{064B}'..='\u{065F}'
        | '\u{0670}'
        | '\u{06D6}'..='\u{06ED}'
        | '\u{0640}')
}

fn fold_letter(c: char) -> char {
    match c {
        // alef with hamza above/below, madda, wasla
        '\u{0622}' | '\u{0623}' | '\u{0625}' | '\u{0671}' => '\u{0627}',
        // alef maqsura
        '\u{0649}' => '\u{064A}',
        // ta marbuta
        '\u{0629}' => '\u{0647}',
        // hamza on waw / ya
        '\u{0624}' => '\u{0648}',
        '\u{0626}' => '\u{064A}',
        other => other,
    }
}

/// Reduces Uthmani or vocalised text to a bare form for matching.
///
/// Idempotent: `normalize_arabic(&normalize_arabic(s)) == normalize_arabic(s)`.
pub fn normalize_arabic(s: &str) -> String {
    let folded: String = s
        .chars()
        .filter(|c| !is_strippable(*c))
        .map(fold_letter)
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True if the string contains at least one Arabic letter.
pub fn is_arabic(s: &str) -> bool {
    s.chars()
        .any(|c| matches!(c, '\u{0621}'..='\u{064A}' | '\u{0671}'..='\u{06D3}'))
}

/// Drops footnote markers (`<sup foot_note=..>1</sup>`) and any remaining tags
/// from translation text.
pub fn strip_markup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if tail.starts_with("<sup") {
            // Footnote content is skipped along with the tag.
            match tail.find("</sup>") {
                Some(end) => rest = &tail[end + "</sup>".len()..],
                None => {
                    rest = "";
                }
            }
            continue;
        }
        match tail.find('>') {
            Some(end) => rest = &tail[end + 1..],
            None => {
                out.push_str(tail);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_arabic_numerals() {
        assert_eq!(to_arabic_numerals("2025"), "٢٠٢٥");
        assert_eq!(to_arabic_numerals("2:255"), "٢:٢٥٥");
        assert_eq!(to_arabic_numerals("abc"), "abc");
        assert_eq!(to_arabic_numerals("٣"), "٣");
    }

    #[test]
    fn test_to_arabic_numerals_keeps_positions() {
        let input = "v1.0 (7)";
        let output = to_arabic_numerals(input);
        assert_eq!(input.chars().count(), output.chars().count());
        for (a, b) in input.chars().zip(output.chars()) {
            assert_eq!(a.is_ascii_digit(), b != a);
        }
    }

    #[test]
    fn test_normalize_strips_diacritics() {
        assert_eq!(normalize_arabic("بِسْمِ ٱللَّهِ ٱلرَّحْمَٰنِ ٱلرَّحِيمِ"), "بسم الله الرحمن الرحيم");
        assert_eq!(normalize_arabic("ٱلْعَٰلَمِينَ"), "العلمين");
        assert_eq!(normalize_arabic("مُوسَىٰ"), "موسي");
        assert_eq!(normalize_arabic("رَحْمَةً"), "رحمه");
    }

    #[test]
    fn test_normalize_collapses_pause_marks() {
        assert_eq!(normalize_arabic("ٱلْفُرْقَانَ ۗ إِنَّ"), "الفرقان ان");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "صِرَٰطَ ٱلَّذِينَ أَنْعَمْتَ عَلَيْهِمْ غَيْرِ ٱلْمَغْضُوبِ عَلَيْهِمْ وَلَا ٱلضَّآلِّينَ",
            "كَفَرُوا۟ بِـَٔايَٰتِ ٱللَّهِ",
            "إِيَّاكَ نَعْبُدُ",
            "plain ascii",
            "",
        ];
        for s in samples {
            let once = normalize_arabic(s);
            assert_eq!(normalize_arabic(&once), once);
        }
    }

    #[test]
    fn test_is_arabic() {
        assert!(is_arabic("الرحمن"));
        assert!(is_arabic("mercy الرحمن"));
        assert!(!is_arabic("mercy"));
        assert!(!is_arabic("٢٠٢٥"));
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(
            strip_markup("All praise is for Allah<sup foot_note=\"77\">1</sup>—Lord of all worlds,"),
            "All praise is for Allah—Lord of all worlds,"
        );
        assert_eq!(strip_markup("<i>In the Name</i> of Allah"), "In the Name of Allah");
        assert_eq!(strip_markup("no tags"), "no tags");
    }
}
