//! Opening detection: explicit PGN tags first, then a small ECO book,
//! then first-two-ply patterns.

use regex::Regex;

pub const UNKNOWN_OPENING: &str = "Unknown Opening";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedOpening {
    pub name: String,
    pub eco: Option<String>,
}

/// Fixed ECO-code-to-name book. Codes outside the book fall through to the
/// two-ply patterns below.
const ECO_BOOK: &[(&str, &str)] = &[
    // A - Flank openings
    ("A00", "Uncommon Opening"),
    ("A04", "Reti Opening"),
    ("A06", "Zukertort Opening"),
    ("A10", "English Opening"),
    ("A12", "English Opening: Caro-Kann Defensive System"),
    ("A20", "English Opening"),
    ("A25", "English Opening: Sicilian Reversed"),
    ("A40", "Queen's Pawn Game"),
    ("A45", "Trompowsky Attack"),
    ("A46", "Queen's Pawn: Torre Attack"),
    ("A48", "London System"),
    // B - Semi-open (1.e4 defenses)
    ("B00", "King's Pawn Game"),
    ("B01", "Scandinavian Defense"),
    ("B06", "Robatsch (Modern) Defense"),
    ("B07", "Pirc Defense"),
    ("B10", "Caro-Kann Defense"),
    ("B20", "Sicilian Defense"),
    ("B22", "Alapin Sicilian"),
    ("B23", "Closed Sicilian"),
    ("B30", "Sicilian Defense: Rossolimo"),
    ("B40", "Sicilian Defense: Scheveningen"),
    // C - Open games (1.e4 e5)
    ("C20", "King's Pawn Game"),
    ("C23", "Bishop's Opening"),
    ("C30", "King's Gambit"),
    ("C40", "King's Knight Opening"),
    ("C50", "Italian Game"),
    ("C60", "Ruy Lopez"),
    ("C65", "Ruy Lopez: Berlin Defense"),
    ("C70", "Ruy Lopez: Classical"),
    // D - Closed (d4 d5 c4)
    ("D00", "Queen's Pawn Game"),
    ("D02", "London System"),
    ("D04", "Colle System"),
    ("D10", "Slav Defense"),
    ("D20", "Queen's Gambit Accepted"),
    ("D30", "Queen's Gambit"),
    ("D31", "Queen's Gambit Declined"),
    // E - Indian Defenses (1.d4 Nf6)
    ("E00", "Indian Defense"),
    ("E20", "Nimzo-Indian Defense"),
    ("E60", "King's Indian Defense"),
    ("E80", "King's Indian Defense: Saemisch"),
];

fn eco_book_name(eco: &str) -> Option<&'static str> {
    ECO_BOOK
        .iter()
        .find(|(code, _)| *code == eco)
        .map(|(_, name)| *name)
}

/// Classify the opening of a game from its PGN. Resolution order, first
/// match wins: an explicit Opening tag, the ECO book, the first two plies.
/// Never fails; empty or malformed PGN yields "Unknown Opening".
pub fn classify_opening(pgn: &str) -> ClassifiedOpening {
    if pgn.is_empty() {
        return ClassifiedOpening {
            name: UNKNOWN_OPENING.to_string(),
            eco: None,
        };
    }

    let eco_re = Regex::new(r#"(?i)\[ECO\s+"([^"]+)"\]"#).unwrap();
    let eco = eco_re
        .captures(pgn)
        .map(|cap| cap[1].to_string());

    let opening_re = Regex::new(r#"(?i)\[Opening\s+"([^"]+)"\]"#).unwrap();
    if let Some(cap) = opening_re.captures(pgn) {
        return ClassifiedOpening {
            name: cap[1].to_string(),
            eco,
        };
    }

    if let Some(name) = eco.as_deref().and_then(eco_book_name) {
        return ClassifiedOpening {
            name: name.to_string(),
            eco,
        };
    }

    let Some(moves_line) = pgn
        .lines()
        .find(|l| l.trim_start().starts_with("1."))
    else {
        return ClassifiedOpening {
            name: UNKNOWN_OPENING.to_string(),
            eco,
        };
    };

    // Strip comments and move numbers, keep the first two plies.
    let comment_re = Regex::new(r"\{[^}]+\}").unwrap();
    let number_re = Regex::new(r"\d+\.(\.\.)?").unwrap();
    let without_comments = comment_re.replace_all(moves_line, "");
    let cleaned = number_re.replace_all(&without_comments, "");
    let mut plies = cleaned.split_whitespace().map(|m| m.to_lowercase());
    let m1 = plies.next().unwrap_or_default();
    let m2 = plies.next().unwrap_or_default();

    let name = match (m1.as_str(), m2.as_str()) {
        ("e4", "c5") => "Sicilian Defense",
        ("e4", "e5") => "Open Game (1.e4 e5)",
        ("e4", "e6") => "French Defense",
        ("e4", "c6") => "Caro-Kann Defense",
        ("e4", "d5") => "Scandinavian Defense",
        ("d4", "d5") => "Queen's Gambit / QGD",
        ("d4", "nf6") => "Indian Defense",
        ("d4", "g6") => "King's Indian / Grünfeld",
        ("c4", _) => "English Opening",
        ("nf3", _) => "Reti Opening",
        ("g3", _) => "King's Fianchetto Opening",
        _ => UNKNOWN_OPENING,
    };

    ClassifiedOpening {
        name: name.to_string(),
        eco,
    }
}
