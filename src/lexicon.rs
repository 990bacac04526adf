// src/lexicon.rs

//! Lexicon matching: city lookup, postal-code extraction, keyword scoring.
//!
//! Pure functions over text; no state. Used by adapters to guess locations
//! and by the categorizer to score category keywords.

use std::sync::OnceLock;

use regex::Regex;

/// Known cities in the DACH region, checked before the postal-code fallback.
const CITIES: &[&str] = &[
    // Oesterreich
    "Wien",
    "Graz",
    "Linz",
    "Salzburg",
    "Innsbruck",
    "Klagenfurt",
    "Villach",
    "Wels",
    "St. Poelten",
    "Dornbirn",
    "Wiener Neustadt",
    "Steyr",
    "Feldkirch",
    "Bregenz",
    "Leonding",
    "Klosterneuburg",
    "Baden",
    "Wolfsberg",
    "Leoben",
    // Deutschland
    "Berlin",
    "Hamburg",
    "Muenchen",
    "Koeln",
    "Frankfurt",
    "Stuttgart",
    "Duesseldorf",
    "Leipzig",
    "Dortmund",
    "Essen",
    "Bremen",
    "Dresden",
    "Hannover",
    "Nuernberg",
    "Duisburg",
    "Bochum",
    "Wuppertal",
    "Bielefeld",
    "Bonn",
    "Muenster",
    "Karlsruhe",
    "Mannheim",
    "Augsburg",
    "Wiesbaden",
    "Moenchengladbach",
    "Gelsenkirchen",
    "Aachen",
    "Braunschweig",
    "Chemnitz",
    "Kiel",
    "Krefeld",
    "Halle",
    "Magdeburg",
    "Freiburg",
    "Oberhausen",
    "Luebeck",
    "Erfurt",
    "Mainz",
    "Rostock",
    "Kassel",
    "Hagen",
    "Saarbruecken",
    "Hamm",
    "Potsdam",
    "Ludwigshafen",
    "Oldenburg",
    "Leverkusen",
    "Osnabrueck",
    "Solingen",
    "Heidelberg",
    "Herne",
    "Neuss",
    "Darmstadt",
    "Paderborn",
    "Regensburg",
    "Ingolstadt",
    "Wuerzburg",
    "Wolfsburg",
    "Fuerth",
    "Ulm",
    "Heilbronn",
    "Offenbach",
    "Goettingen",
    "Bottrop",
    "Pforzheim",
    "Recklinghausen",
    "Reutlingen",
    "Koblenz",
    "Remscheid",
    "Bergisch Gladbach",
    "Bremerhaven",
    "Jena",
    "Trier",
    "Erlangen",
    "Moers",
    "Siegen",
    "Hildesheim",
    "Salzgitter",
    "Cottbus",
    "Kaiserslautern",
    // Schweiz
    "Zuerich",
    "Genf",
    "Basel",
    "Bern",
    "Lausanne",
    "Winterthur",
    "Luzern",
    "St. Gallen",
    // Mit Umlauten
    "München",
    "Köln",
    "Düsseldorf",
    "Nürnberg",
    "Würzburg",
    "Zürich",
    "Pölten",
];

/// Look up a known city name in the text, case-insensitively.
pub fn known_city(text: &str) -> Option<&'static str> {
    let text_lower = text.to_lowercase();
    CITIES
        .iter()
        .find(|city| text_lower.contains(&city.to_lowercase()))
        .copied()
}

/// Extract a place name following a postal code, e.g. "5020 Salzburg" or
/// "79618 Rheinfelden".
pub fn postal_place(text: &str) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"(\d{4,5})\s+([A-ZÄÖÜ][a-zäöüß]+(?:\s+[A-ZÄÖÜ][a-zäöüß]+)?)")
            .expect("valid regex")
    });

    pattern
        .captures(text)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Best-effort city guess: known city first, postal-code place second.
pub fn find_city(text: &str) -> Option<String> {
    known_city(text)
        .map(|c| c.to_string())
        .or_else(|| postal_place(text))
}

/// Score a keyword set against a title and a combined text.
///
/// A keyword found in the title scores 2; found only in the combined text it
/// scores 1. Both inputs must already be lowercase.
pub fn keyword_score(keywords: &[&str], title_lower: &str, combined_lower: &str) -> u32 {
    keywords
        .iter()
        .map(|kw| {
            if title_lower.contains(kw) {
                2
            } else if combined_lower.contains(kw) {
                1
            } else {
                0
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_city_case_insensitive() {
        assert_eq!(known_city("Neubau Kindergarten in SALZBURG"), Some("Salzburg"));
        assert_eq!(known_city("irgendwo am Land"), None);
    }

    #[test]
    fn test_postal_place() {
        assert_eq!(
            postal_place("Bauvorhaben 79618 Rheinfelden (Baden)"),
            Some("Rheinfelden".to_string())
        );
        assert_eq!(postal_place("ohne Postleitzahl"), None);
    }

    #[test]
    fn test_find_city_prefers_known() {
        // both a known city and a postal match present
        let text = "Sanierung in 8010 Graz";
        assert_eq!(find_city(text), Some("Graz".to_string()));
    }

    #[test]
    fn test_find_city_postal_fallback() {
        assert_eq!(
            find_city("Neubau 6850 Hohenems"),
            Some("Hohenems".to_string())
        );
    }

    #[test]
    fn test_keyword_score_weights_title() {
        let keywords = ["dach", "abdichtung"];
        let title = "dachsanierung rathaus";
        let combined = "dachsanierung rathaus erneuerung flachdach mit abdichtung";
        // "dach" in title => 2, "abdichtung" only in description => 1
        assert_eq!(keyword_score(&keywords, title, combined), 3);
    }

    #[test]
    fn test_keyword_score_zero() {
        assert_eq!(keyword_score(&["fenster"], "strassenbau", "strassenbau"), 0);
    }
}
