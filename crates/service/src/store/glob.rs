//! Redis-style glob matching for `KEYS` patterns.
//!
//! Supported: `*`, `?`, `[abc]`, `[a-z]`, `[^x]` and `\` escapes. A class
//! missing its closing `]` runs to the end of the pattern, as Redis does.
//! A trailing `-` takes the `]` as its range end, so `[a-]` is the range
//! `]`..=`a` and leaves the class unterminated.

pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0usize, 0usize);
    // Resume point of the most recent `*`: (pattern index after it, text index it is absorbing up to).
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() {
            if p[pi] == '*' {
                while pi < p.len() && p[pi] == '*' {
                    pi += 1;
                }
                star = Some((pi, ti));
                continue;
            }
            let (consumed, ok) = match_one(&p[pi..], t[ti]);
            if ok {
                pi += consumed;
                ti += 1;
                continue;
            }
        }
        match star {
            Some((sp, st)) => {
                pi = sp;
                ti = st + 1;
                star = Some((sp, st + 1));
            }
            None => return false,
        }
    }

    p[pi..].iter().all(|&c| c == '*')
}

/// Match a single text char against the token at the head of `p`.
/// Returns how many pattern chars the token spans and whether it matched.
fn match_one(p: &[char], c: char) -> (usize, bool) {
    match p[0] {
        '?' => (1, true),
        '\\' if p.len() >= 2 => (2, p[1] == c),
        '[' => match_class(p, c),
        literal => (1, literal == c),
    }
}

fn match_class(p: &[char], c: char) -> (usize, bool) {
    let mut i = 1;
    let negate = p.get(1) == Some(&'^');
    if negate {
        i += 1;
    }

    let mut matched = false;
    while i < p.len() && p[i] != ']' {
        if p[i] == '\\' && i + 1 < p.len() {
            matched |= p[i + 1] == c;
            i += 2;
        } else if i + 2 < p.len() && p[i + 1] == '-' {
            let (lo, hi) = if p[i] <= p[i + 2] { (p[i], p[i + 2]) } else { (p[i + 2], p[i]) };
            matched |= lo <= c && c <= hi;
            i += 3;
        } else {
            matched |= p[i] == c;
            i += 1;
        }
    }

    let consumed = if i < p.len() { i + 1 } else { i };
    (consumed, matched != negate)
}

#[cfg(test)]
mod tests {
    use super::glob_match;

    #[test]
    fn star_and_question() {
        assert!(glob_match("*", ""));
        assert!(glob_match("*", "anything"));
        assert!(glob_match("h?llo", "hello"));
        assert!(glob_match("h*llo", "heeeello"));
        assert!(glob_match("h*llo", "hllo"));
        assert!(!glob_match("h?llo", "hllo"));
        assert!(glob_match("user:*:name", "user:42:name"));
        assert!(!glob_match("user:*:name", "user:42:email"));
        assert!(glob_match("a**b", "ab"));
    }

    #[test]
    fn classes() {
        assert!(glob_match("h[ae]llo", "hello"));
        assert!(glob_match("h[ae]llo", "hallo"));
        assert!(!glob_match("h[ae]llo", "hillo"));
        assert!(glob_match("h[^e]llo", "hallo"));
        assert!(!glob_match("h[^e]llo", "hello"));
        assert!(glob_match("h[a-b]llo", "hbllo"));
        assert!(!glob_match("h[a-b]llo", "hcllo"));
        assert!(glob_match("h[b-a]llo", "hallo"));
    }

    #[test]
    fn escapes_match_literally() {
        assert!(glob_match("a\\*b", "a*b"));
        assert!(!glob_match("a\\*b", "axb"));
        assert!(glob_match("what\\?", "what?"));
        assert!(glob_match("[\\]]", "]"));
    }

    #[test]
    fn unterminated_class_runs_to_end() {
        assert!(glob_match("ab[cd", "abc"));
        assert!(glob_match("ab[cd", "abd"));
        assert!(!glob_match("ab[cd", "ab["));
    }

    #[test]
    fn dash_before_close_is_a_range_to_bracket() {
        assert!(glob_match("[a-]", "a"));
        assert!(glob_match("[a-]", "_"));
        assert!(glob_match("[a-]", "]"));
        assert!(!glob_match("[a-]", "-"));
        assert!(!glob_match("[a-]", "b"));
        // the class swallowed its `]`, so the tail is still class members
        assert!(glob_match("[a-]x", "x"));
        assert!(!glob_match("[a-]x", "ax"));
    }

    #[test]
    fn exact_and_empty() {
        assert!(glob_match("a", "a"));
        assert!(!glob_match("a", "b"));
        assert!(!glob_match("", "a"));
        assert!(glob_match("", ""));
        assert!(!glob_match("abc", "abcd"));
    }

    #[test]
    fn backtracks_across_multiple_stars() {
        assert!(glob_match("*a*b*c", "xxaxxbxxbxc"));
        assert!(!glob_match("*a*b*c", "xxaxxbxxbx"));
    }
}
