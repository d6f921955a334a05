use super::types::{Loc, Located};

pub(crate) const COMMENT_CHAR: char = '#';

/// Split one source line into its tokens. Everything from the first token
/// starting with `COMMENT_CHAR` onward is dropped, so a comment must be
/// separated from the preceding token by whitespace.
pub fn tokenize_line(line: &str) -> Vec<String> {
    line.trim()
        .split_whitespace()
        .take_while(|tk| !tk.starts_with(COMMENT_CHAR))
        .map(ToOwned::to_owned)
        .collect()
}

/// Tokenize a whole source text, skipping blank and comment-only lines.
/// Line numbers are 1-based.
pub fn tokenize(source: &str) -> Vec<Located<Vec<String>>> {
    source
        .lines()
        .enumerate()
        .map(|(idx, line)| Located::with_loc(Loc::new(idx + 1), tokenize_line(line)))
        .filter(|tokens| !tokens.as_value().is_empty())
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn tokens(line: &str) -> Vec<String> {
        tokenize_line(line)
    }

    #[test]
    fn simple() {
        assert_eq!(tokens("LET A = 0105"), vec!["LET", "A", "=", "0105"]);
    }

    #[test]
    fn repeated_whitespace() {
        assert_eq!(
            tokens("   MEMCOPY\tB    TO  DISPLAY  "),
            vec!["MEMCOPY", "B", "TO", "DISPLAY"]
        );
    }

    #[test]
    fn trailing_comment() {
        assert_eq!(tokens("GOTO top # loop forever"), vec!["GOTO", "top"]);
    }

    #[test]
    fn comment_token_without_space() {
        assert_eq!(tokens("HALT #done"), vec!["HALT"]);
    }

    #[test]
    fn comment_only() {
        assert!(tokens("# just words").is_empty());
        assert!(tokens("    #").is_empty());
    }

    #[test]
    fn blank() {
        assert!(tokens("").is_empty());
        assert!(tokens(" \t ").is_empty());
    }

    #[test]
    fn hash_inside_token_is_kept() {
        assert_eq!(tokens("LABEL a#b"), vec!["LABEL", "a#b"]);
    }

    #[test]
    fn source_skips_empty_lines_and_keeps_line_numbers() {
        let lines = tokenize("# header\n\nLABEL top\n   \nGOTO top # again\n");
        let locs: Vec<usize> = lines
            .iter()
            .map(|tks| tks.loc().line())
            .collect();
        assert_eq!(locs, vec![3, 5]);
        assert_eq!(lines[1].as_value(), &vec!["GOTO", "top"]);
    }
}
