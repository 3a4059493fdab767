//! Cleanup of text that was laid out for print, not for reading back.

use regex_lite::Regex;
use static_init::dynamic;

#[dynamic]
static PARENTHESES_RE: Regex = Regex::new(r"\(.*?\)").unwrap();
#[dynamic]
static HYPHEN_UPPER_RE: Regex = Regex::new(r"- ([A-Z])").unwrap();
#[dynamic]
static HYPHEN_LOWER_RE: Regex = Regex::new(r"- ([a-z])").unwrap();

/// Trims the line and collapses every whitespace run to a single space.
pub fn normalize(line: &str) -> String {
    line.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Removes every parenthesized section, i.e. the allergen annotations.
///
/// Matching is non-nested and stops at the first closing parenthesis, so
/// "(a (b) c)" leaves " c)" behind.
pub fn remove_allergens(line: &str) -> String {
    PARENTHESES_RE.replace_all(line, "").into_owned()
}

/// Joins the name fragments of one meal into a display name.
pub fn build_meal_name<S: AsRef<str>>(meal_lines: &[S]) -> String {
    let joined = meal_lines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(" ");

    let name = normalize(&remove_allergens(&joined));

    // "Kartoffel- Gurkensalat": the hyphen belongs to the word
    let name = HYPHEN_UPPER_RE.replace_all(&name, "-$1");
    // "Gur- kensalat": hyphenation from a line wrap
    let name = HYPHEN_LOWER_RE.replace_all(&name, "$1");

    let name = space_after_commas(&name.replace(" ,", ","));
    // drops commas whose annotation got removed
    let name = name.replace(" , ", " ");

    name.trim().to_string()
}

/// Inserts a space after every comma that is directly followed by a
/// non-whitespace character.
fn space_after_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        out.push(c);
        if c == ',' {
            if let Some(next) = chars.peek() {
                if !next.is_whitespace() {
                    out.push(' ');
                }
            }
        }
    }

    out
}

/// Replaces non-breaking spaces (raw or as entity) with plain spaces and trims.
pub fn normalize_nbsp(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  Spätzle \t mit   Soße \n"), "Spätzle mit Soße");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn meal_name_from_fragments() {
        let lines = [
            "Wiener Backhendl (14,",
            "34W)",
            "Remouladensoße, (2, 9, 14, 24,",
            "27, 30, 35),",
            "Kartoffel-Gurkensalat (27)",
        ];
        assert_eq!(
            build_meal_name(&lines),
            "Wiener Backhendl Remouladensoße, Kartoffel-Gurkensalat"
        );
    }

    #[test]
    fn hyphens_across_lines() {
        assert_eq!(
            build_meal_name(&["Kartoffel-", "Gurkensalat"]),
            "Kartoffel-Gurkensalat"
        );
        assert_eq!(build_meal_name(&["Gemüse-", "pfanne"]), "Gemüsepfanne");
    }

    #[test]
    fn comma_spacing() {
        assert_eq!(build_meal_name(&["Reis ,Salat"]), "Reis, Salat");
        assert_eq!(build_meal_name(&["Nudeln,Pesto"]), "Nudeln, Pesto");
    }

    #[test]
    fn nested_parentheses_leave_residue() {
        assert_eq!(remove_allergens("Eintopf (a (b) c) Brot"), "Eintopf  c) Brot");
    }

    #[test]
    fn nbsp_cleanup() {
        assert_eq!(normalize_nbsp("\u{a0}4,30&nbsp;€ "), "4,30 €");
    }
}
