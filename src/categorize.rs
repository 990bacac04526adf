// src/categorize.rs

//! Keyword-based tender categorization.
//!
//! An ordered table of construction-trade categories, each with a keyword
//! set. Scoring weights title matches double; the highest-scoring category
//! wins and ties go to the first-declared category. Declaration order is
//! therefore part of the contract.

use crate::lexicon;

/// Returned when no category scores above zero.
pub const FALLBACK_CATEGORY: &str = "Sonstige Bauleistungen";

/// Category table in declaration (= tie-break) order.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Hochbau",
        &[
            "hochbau",
            "neubau",
            "gebäude",
            "gebaeude",
            "wohnbau",
            "wohnhaus",
            "bürogebäude",
            "buerogebaeude",
            "geschossbau",
            "mehrfamilienhaus",
            "einfamilienhaus",
            "rohbau",
            "mauerwerk",
            "betonbau",
        ],
    ),
    (
        "Tiefbau",
        &[
            "tiefbau",
            "kanalbau",
            "kanal",
            "entwässerung",
            "entwaesserung",
            "abwasser",
            "kanalisation",
            "schacht",
            "rohrverlegung",
        ],
    ),
    (
        "Strassenbau",
        &[
            "straßenbau",
            "strassenbau",
            "asphalt",
            "pflaster",
            "gehweg",
            "radweg",
            "fahrbahn",
            "verkehrsweg",
            "straßensanierung",
            "strassensanierung",
        ],
    ),
    (
        "Elektroinstallation",
        &[
            "elektro",
            "elektrisch",
            "starkstrom",
            "schwachstrom",
            "beleuchtung",
            "photovoltaik",
            "pv-anlage",
            "solar",
            "elektroinstallation",
            "kabel",
        ],
    ),
    (
        "Heizung/Sanitaer/Klima",
        &[
            "heizung",
            "sanitär",
            "sanitaer",
            "klima",
            "lüftung",
            "lueftung",
            "hls",
            "hvac",
            "wärmepumpe",
            "waermepumpe",
            "gas",
            "fernwärme",
        ],
    ),
    (
        "Maler/Lackierer",
        &["maler", "anstrich", "lackier", "beschichtung", "farbig", "wandfarbe"],
    ),
    (
        "Trockenbau",
        &["trockenbau", "gipskarton", "rigips", "deckenabhängung", "akustikdecke"],
    ),
    (
        "Fassadenbau",
        &[
            "fassade",
            "wärmedämmung",
            "waermedaemmung",
            "wdvs",
            "außenwand",
            "aussenwand",
            "verkleidung",
            "vorhangfassade",
        ],
    ),
    (
        "Dacharbeiten",
        &[
            "dach",
            "dachdecker",
            "dachsanierung",
            "dachziegel",
            "flachdach",
            "steildach",
            "abdichtung",
            "bitumen",
        ],
    ),
    (
        "Fenster/Tueren",
        &[
            "fenster",
            "tür",
            "tuer",
            "verglasung",
            "glas",
            "türen",
            "tueren",
            "fensterbau",
            "rolladen",
            "jalousie",
        ],
    ),
    (
        "Bodenbelag",
        &[
            "boden",
            "bodenbelag",
            "parkett",
            "laminat",
            "fliese",
            "estrich",
            "teppich",
            "linoleum",
            "vinyl",
            "bodenlegearb",
        ],
    ),
    (
        "Metallbau",
        &[
            "metall",
            "stahl",
            "schlosser",
            "geländer",
            "gelaender",
            "stahlbau",
            "konstruktion",
            "schweißen",
            "schweissen",
        ],
    ),
    (
        "Holzbau/Zimmerer",
        &[
            "holzbau",
            "zimmerer",
            "zimmermann",
            "holzkonstruktion",
            "dachstuhl",
            "carport",
            "holzfassade",
        ],
    ),
    (
        "Garten-/Landschaftsbau",
        &[
            "garten",
            "landschaft",
            "grünanlage",
            "gruenanlage",
            "pflanz",
            "baumpflege",
            "spielplatz",
            "außenanlage",
            "aussenanlage",
        ],
    ),
    (
        "Abbruch/Entsorgung",
        &[
            "abbruch",
            "abriss",
            "rückbau",
            "rueckbau",
            "entsorgung",
            "demontage",
            "schadstoff",
            "asbest",
            "kontaminiert",
        ],
    ),
    (
        "Erdarbeiten",
        &[
            "erdarbeit",
            "aushub",
            "erdbau",
            "baggerarbeit",
            "gründung",
            "gruendung",
            "fundament",
            "baugrube",
            "verfüllung",
        ],
    ),
    (
        "Aufzuege/Foerdertechnik",
        &[
            "aufzug",
            "fahrstuhl",
            "lift",
            "förderanlage",
            "foerderanlage",
            "aufzugsanlage",
            "treppenlift",
        ],
    ),
    (
        "Brandschutz",
        &[
            "brandschutz",
            "feuerschutz",
            "brandmelde",
            "sprinkler",
            "rauchmelder",
            "brandschott",
            "fluchtweg",
        ],
    ),
    (
        "Planung/Architektur",
        &[
            "planung",
            "architekt",
            "generalplan",
            "entwurf",
            "bauüberwachung",
            "bauueberwachung",
            "projektsteuerung",
            "öba",
            "oeba",
        ],
    ),
    (
        "IT/Technik",
        &[
            "it-",
            "software",
            "hardware",
            "netzwerk",
            "server",
            "datenverarbeitung",
            "telekommunikation",
            "medientechnik",
        ],
    ),
    (
        "Reinigung",
        &[
            "reinigung",
            "gebäudereinigung",
            "gebaeudereinigung",
            "unterhaltsreinigung",
            "glasreinigung",
            "sonderreinigung",
        ],
    ),
    (
        "Moebel/Einrichtung",
        &[
            "möbel",
            "moebel",
            "einrichtung",
            "büromöbel",
            "bueromoebel",
            "schrank",
            "tisch",
            "stuhl",
            "ausstattung",
        ],
    ),
    (
        "Lieferung/Material",
        &["lieferung", "beschaffung", "material", "baustoffe", "liefern"],
    ),
];

/// Categorize a tender from its title and description.
pub fn categorize(title: &str, description: &str) -> String {
    let title_lower = title.to_lowercase();
    let combined_lower = format!("{} {}", title_lower, description.to_lowercase());

    let mut best: Option<(&str, u32)> = None;
    for (label, keywords) in CATEGORIES {
        let score = lexicon::keyword_score(keywords, &title_lower, &combined_lower);
        if score == 0 {
            continue;
        }
        // strictly greater: equal scores keep the earlier declaration
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((label, score));
        }
    }

    best.map(|(label, _)| label.to_string())
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string())
}

/// All category labels, fallback included.
pub fn all_categories() -> Vec<&'static str> {
    CATEGORIES
        .iter()
        .map(|(label, _)| *label)
        .chain(std::iter::once(FALLBACK_CATEGORY))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dacharbeiten() {
        assert_eq!(
            categorize("Dachsanierung Rathaus", "Erneuerung Flachdach mit Abdichtung"),
            "Dacharbeiten"
        );
    }

    #[test]
    fn test_moebel() {
        assert_eq!(
            categorize("Lieferung von Büromöbeln", "Schreibtische und Stühle"),
            "Moebel/Einrichtung"
        );
    }

    #[test]
    fn test_bodenbelag() {
        assert_eq!(
            categorize(
                "Bodenlegearbeiten - Neubau Forensik",
                "Verlegung von Parkett und Laminat"
            ),
            "Bodenbelag"
        );
    }

    #[test]
    fn test_strassenbau() {
        assert_eq!(
            categorize(
                "Straßenbau Ortsdurchfahrt",
                "Asphaltierung und Pflasterarbeiten"
            ),
            "Strassenbau"
        );
    }

    #[test]
    fn test_fallback() {
        assert_eq!(
            categorize("Irgendetwas ganz anderes", "ohne bekannte Begriffe"),
            FALLBACK_CATEGORY
        );
    }

    #[test]
    fn test_tie_breaks_to_declaration_order() {
        // one keyword hit each, both in the description only: Hochbau is
        // declared before Tiefbau and must win the tie
        assert_eq!(categorize("Vergabe", "mauerwerk und schacht"), "Hochbau");
    }

    #[test]
    fn test_all_categories_include_fallback() {
        let all = all_categories();
        assert!(all.contains(&"Dacharbeiten"));
        assert_eq!(*all.last().unwrap(), FALLBACK_CATEGORY);
    }
}
