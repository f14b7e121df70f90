//! PGN text utilities, all lightweight regex extraction.

use regex::Regex;

/// Extract a string value from a PGN header tag (e.g. White, TimeControl).
pub fn extract_header(pgn: &str, header_name: &str) -> Option<String> {
    let pattern = format!(r#"(?i)\[{}\s+"([^"]*)"\]"#, regex::escape(header_name));
    let re = Regex::new(&pattern).ok()?;
    let value = re.captures(pgn)?.get(1)?.as_str().to_string();
    if value.is_empty() { None } else { Some(value) }
}

/// Extract an integer value from a PGN header.
pub fn extract_header_int(pgn: &str, header_name: &str) -> Option<i32> {
    let pattern = format!(r#"(?i)\[{}\s+"(\d+)"\]"#, regex::escape(header_name));
    let re = Regex::new(&pattern).ok()?;
    re.captures(pgn)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}

/// Extract SAN moves from PGN text (after removing headers, comments, variations).
pub fn extract_moves(pgn: &str) -> Vec<String> {
    // Remove headers
    let header_re = Regex::new(r"\[[^\]]*\]").unwrap();
    let no_headers = header_re.replace_all(pgn, "");

    // Remove comments
    let comment_re = Regex::new(r"\{[^}]*\}").unwrap();
    let no_comments = comment_re.replace_all(&no_headers, "");

    // Remove variations
    let variation_re = Regex::new(r"\([^)]*\)").unwrap();
    let no_variations = variation_re.replace_all(&no_comments, "");

    // Extract moves
    let move_re =
        Regex::new(r"[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=[QRBN])?[+#]?|O-O-O|O-O").unwrap();

    move_re
        .find_iter(&no_variations)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// First move after "1." on a movetext line, e.g. "e4" or "Nf3".
pub fn extract_first_move(pgn: &str) -> Option<String> {
    let re = Regex::new(r"(?m)^1\.\s*([a-h][1-8]|[NBRQK][a-h][1-8])").unwrap();
    Some(re.captures(pgn)?.get(1)?.as_str().to_string())
}

/// Count of move-number tokens ("1.", "2.", ...) in the movetext.
/// Annotated PGNs repeat the number before black's reply ("1..."), so this
/// overcounts for those; the stored `move_count` field has always been
/// computed this way.
pub fn count_moves(pgn: &str) -> u32 {
    let re = Regex::new(r"\d+\.").unwrap();
    re.find_iter(pgn).count() as u32
}

/// The other side's name from the White/Black header tags, given one
/// participant's username (case-insensitive).
pub fn resolve_opponent_name(pgn: &str, username: &str) -> Option<String> {
    let white = extract_header(pgn, "White");
    let black = extract_header(pgn, "Black");

    if let Some(ref w) = white {
        if w.eq_ignore_ascii_case(username) {
            return black;
        }
    }
    if let Some(ref b) = black {
        if b.eq_ignore_ascii_case(username) {
            return white;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const PGN: &str = r#"[White "Player1"]
[Black "Player2"]
[Result "1-0"]
[WhiteElo "1500"]
[BlackElo "1600"]

1. e4 e5 2. Nf3 Nc6 1-0"#;

    #[test]
    fn test_extract_moves() {
        assert_eq!(extract_moves(PGN), vec!["e4", "e5", "Nf3", "Nc6"]);
    }

    #[test]
    fn test_extract_moves_strips_comments_and_variations() {
        let pgn = "1. e4 {best by test} e5 (1... c5 2. Nf3) 2. Nf3 Nc6";
        assert_eq!(extract_moves(pgn), vec!["e4", "e5", "Nf3", "Nc6"]);
    }

    #[test]
    fn test_extract_header() {
        assert_eq!(extract_header(PGN, "White").as_deref(), Some("Player1"));
        assert_eq!(extract_header(PGN, "Result").as_deref(), Some("1-0"));
        assert_eq!(extract_header(PGN, "Event"), None);
    }

    #[test]
    fn test_extract_header_int() {
        assert_eq!(extract_header_int(PGN, "WhiteElo"), Some(1500));
        assert_eq!(extract_header_int(PGN, "BlackElo"), Some(1600));
        assert_eq!(extract_header_int(PGN, "Missing"), None);
    }

    #[test]
    fn test_extract_first_move() {
        assert_eq!(extract_first_move(PGN).as_deref(), Some("e4"));
        assert_eq!(extract_first_move("1. Nf3 d5").as_deref(), Some("Nf3"));
        assert_eq!(extract_first_move(""), None);
    }

    #[test]
    fn test_count_moves() {
        assert_eq!(count_moves(PGN), 2);
        assert_eq!(count_moves(""), 0);
    }

    #[test]
    fn test_resolve_opponent_name() {
        assert_eq!(
            resolve_opponent_name(PGN, "player1").as_deref(),
            Some("Player2")
        );
        assert_eq!(
            resolve_opponent_name(PGN, "PLAYER2").as_deref(),
            Some("Player1")
        );
        assert_eq!(resolve_opponent_name(PGN, "someone_else"), None);
    }
}
