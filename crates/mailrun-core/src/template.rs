//! `[placeholder]` substitution.
//!
//! Single left-to-right scan. A marker `[k]` whose key is present is replaced by
//! its value; any other bracketed text is copied through untouched. Replacement
//! values are never scanned again.

use crate::domain::Substitutions;

pub fn render(text: &str, substitutions: &Substitutions) -> String {
    if substitutions.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        let replaced = after_open.find(']').and_then(|close| {
            substitutions
                .get(&after_open[..close])
                .map(|value| (value, close))
        });

        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after_open[close + 1..];
            }
            None => {
                // Not a known marker: keep the bracket and rescan right after it,
                // so "[[Name]" still finds "[Name]".
                out.push('[');
                rest = after_open;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Global substitutions overlaid by recipient-specific ones.
pub fn merge(global: &Substitutions, recipient: &Substitutions) -> Substitutions {
    let mut merged = global.clone();
    merged.extend(recipient.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn subs(pairs: &[(&str, &str)]) -> Substitutions {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[rstest]
    #[case::plain_text("Hello world", "Hello world")]
    #[case::single("Hello [Name]", "Hello Bob")]
    #[case::repeated("[Name], [Name]!", "Bob, Bob!")]
    #[case::two_keys("[Name] from [City]", "Bob from Oslo")]
    #[case::unknown_kept("Dear [Title] [Name]", "Dear [Title] Bob")]
    #[case::unclosed("Hello [Name", "Hello [Name")]
    #[case::nested_open("[[Name]]", "[Bob]")]
    #[case::empty_marker("[]", "[]")]
    #[case::adjacent("[Name][City]", "BobOslo")]
    #[case::unicode("Привет, [Name]!", "Привет, Bob!")]
    fn renders_markers(#[case] input: &str, #[case] expected: &str) {
        let s = subs(&[("Name", "Bob"), ("City", "Oslo")]);
        assert_eq!(render(input, &s), expected);
    }

    #[test]
    fn text_without_markers_is_unchanged() {
        let s = subs(&[("Name", "Bob")]);
        let text = "No markers here, just (parens) and {braces}.";
        assert_eq!(render(text, &s), text);
        assert_eq!(render(text, &Substitutions::new()), text);
    }

    #[test]
    fn replacement_is_not_recursive() {
        let s = subs(&[("A", "[B]"), ("B", "deep")]);
        assert_eq!(render("[A]", &s), "[B]");
    }

    #[test]
    fn non_ascii_keys_are_matched() {
        let s = subs(&[("Название компании", "ООО Ромашка")]);
        assert_eq!(render("Для [Название компании]", &s), "Для ООО Ромашка");
    }

    #[test]
    fn recipient_value_wins_on_merge() {
        let global = subs(&[("a", "G"), ("g", "only-global")]);
        let recipient = subs(&[("a", "R")]);
        let merged = merge(&global, &recipient);

        assert_eq!(render("[a]", &merged), "R");
        assert_eq!(render("[g]", &merged), "only-global");
    }
}
