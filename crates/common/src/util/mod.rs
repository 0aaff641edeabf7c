// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

mod bitenum;
mod bitset;

pub use bitenum::BitEnum;
pub use bitset::DenseBitSet;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Wildcard {
    None,
    /// `*` between literal characters: any prefix of the full name at least as long as the
    /// part before the star.
    Inner,
    /// `*` at the end: anything starting with the part before the star.
    Trailing,
}

/// Match a single verb name alias against a word, case-insensitively, with LambdaMOO wildcard
/// rules. Multiple aliases are split and tried further up.
///
/// - `foo*` matches `foo`, `food`, `foobar`
/// - `foo*bar` matches `foo`, `foob`, `fooba`, `foobar`
/// - leading `*`s are dropped and are not wildcards; `*` alone matches anything.
#[must_use]
pub fn verbcasecmp(pattern: &str, word: &str) -> bool {
    let mut p = pattern.chars().peekable();
    let mut w = word.chars().peekable();
    let mut wildcard = Wildcard::None;
    let mut matched_any = false;

    loop {
        while p.next_if_eq(&'*').is_some() {
            wildcard = if p.peek().is_none() {
                Wildcard::Trailing
            } else if matched_any {
                Wildcard::Inner
            } else {
                Wildcard::None
            };
        }
        match (p.peek(), w.peek()) {
            (Some(pc), Some(wc)) if pc.eq_ignore_ascii_case(wc) => {
                p.next();
                w.next();
                matched_any = true;
            }
            _ => break,
        }
    }

    match (w.peek().is_none(), wildcard) {
        (true, Wildcard::None) => p.peek().is_none(),
        (true, _) | (false, Wildcard::Trailing) => true,
        (false, _) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::verbcasecmp;
    use test_case::test_case;

    #[test_case("give", "give", true; "exact")]
    #[test_case("give", "GIVE", true; "case insensitive")]
    #[test_case("give", "giv", false; "no wildcard no prefix")]
    #[test_case("*", "anything", true; "lone star")]
    #[test_case("*", "", true; "lone star empty")]
    #[test_case("foo*", "foo", true; "trailing star exact")]
    #[test_case("foo*", "foogleman", true; "trailing star longer")]
    #[test_case("foo*", "fo", false; "trailing star too short")]
    #[test_case("foo*bar", "foo", true; "inner star minimum")]
    #[test_case("foo*bar", "fooba", true; "inner star partial")]
    #[test_case("foo*bar", "foobar", true; "inner star full")]
    #[test_case("foo*bar", "fo", false; "inner star too short")]
    #[test_case("foo*bar", "foobaar", false; "inner star diverges")]
    #[test_case("foo*bar", "foobarx", false; "inner star overlong")]
    #[test_case("*p", "p", true; "leading star literal")]
    #[test_case("*p", "ap", false; "leading star not wildcard")]
    #[test_case("ps*c", "PSC", true; "pronoun pattern")]
    #[test_case("ps*c", "psomc", false; "pronoun pattern overlong")]
    #[test_case("do", "do_object", false; "no partial word")]
    fn test_verbcasecmp(pattern: &str, word: &str, expected: bool) {
        assert_eq!(verbcasecmp(pattern, word), expected);
    }
}
