//! The built-in cuisine taxonomy.
//!
//! Entries are grouped by broad region for maintainability, but grouping
//! has no semantic effect — only the flattened order matters, because
//! matching is first-match-wins. Ambiguous phrases ("bbq" appears under
//! both Korean and the general-retail group) resolve to whichever entry
//! is listed first; `Taxonomy::ambiguous_triggers` reports every such
//! collision.

use crate::model::{CategoryEntry, GENERAL_RETAIL};

fn entry(
    label: &str,
    region: &str,
    subregion: &str,
    sub_subregion: Option<&str>,
    triggers: &[&str],
) -> CategoryEntry {
    CategoryEntry {
        label: label.to_string(),
        region: Some(region.to_string()),
        subregion: Some(subregion.to_string()),
        sub_subregion: sub_subregion.map(str::to_string),
        triggers: triggers.iter().map(|t| t.to_string()).collect(),
    }
}

fn keyword_group(label: &str, triggers: &[&str]) -> CategoryEntry {
    CategoryEntry {
        label: label.to_string(),
        region: None,
        subregion: None,
        sub_subregion: None,
        triggers: triggers.iter().map(|t| t.to_string()).collect(),
    }
}

/// The full production taxonomy, in evaluation order.
pub fn builtin_entries() -> Vec<CategoryEntry> {
    vec![
        // ── Americas ────────────────────────────────────────────────
        entry(
            "Mexican",
            "Americas",
            "Latin America - Central America",
            Some("Mexico"),
            &[
                "taco", "taqueria", "mexican", "mexico", "el", "la", "los", "las", "mi",
                "michoacana", "bodega", "carniceria", "mercado", "fruteria", "amigos",
                "jalisco", "fiesta", "panaderia", "monterrey", "azteca", "costeno",
                "san miguel", "delicias", "dulceria", "paleteria", "paleta",
            ],
        ),
        entry(
            "Central American",
            "Americas",
            "Latin America - Central America",
            Some("Other Central America"),
            &["pupuseria", "guatemalteca", "salvadoreno", "hondureno", "nica", "nicaragua"],
        ),
        entry(
            "South American",
            "Americas",
            "Latin America - South America",
            Some("Multiple South American"),
            &["brazilian", "colombia", "venezuelan", "peruvian", "argentina", "empanada"],
        ),
        entry(
            "Caribbean",
            "Americas",
            "Latin America - Caribbean",
            Some("Multiple Caribbean"),
            &["caribbean", "jamaica", "jerk", "roti", "afribbean", "haitian", "cuban"],
        ),
        entry(
            "Latino/Hispanic (General)",
            "Americas",
            "Latin America - General",
            None,
            &["latino", "hispana", "hispanic"],
        ),
        // ── Asia: Eastern ───────────────────────────────────────────
        entry(
            "Chinese",
            "Asia",
            "Eastern Asia",
            Some("China"),
            &[
                "chinese", "china", "hong kong", "cantonese", "szechuan", "hunan",
                "fortune supermarket", "wok",
            ],
        ),
        entry(
            "Korean",
            "Asia",
            "Eastern Asia",
            Some("Korea"),
            &[
                "korean", "korea", "h-mart", "h mart", "bbq", "barbeque", "kimchi",
                "somunnan", "banchannara",
            ],
        ),
        entry(
            "Japanese",
            "Asia",
            "Eastern Asia",
            Some("Japan"),
            &["japanese", "japan", "sushi", "teriyaki", "ramen", "tokyo", "osaka"],
        ),
        entry(
            "Mongolian",
            "Asia",
            "Eastern Asia",
            Some("Other Eastern Asia"),
            &["mongolian"],
        ),
        // ── Asia: South Eastern ─────────────────────────────────────
        entry(
            "Vietnamese",
            "Asia",
            "South Eastern Asia",
            Some("Vietnam"),
            &["viet", "pho", "saigon", "truong nguyen", "duc huong", "gio cha", "banh mi"],
        ),
        entry(
            "Thai",
            "Asia",
            "South Eastern Asia",
            Some("Thailand"),
            &["thai", "thailand", "pad thai", "bangkok"],
        ),
        entry(
            "Filipino",
            "Asia",
            "South Eastern Asia",
            Some("Philippines"),
            &["filipino", "philippines", "manila", "pancit", "lumpia"],
        ),
        // ── Asia: South Central ─────────────────────────────────────
        entry(
            "Indian/South Asian",
            "Asia",
            "South Central Asia",
            Some("Multiple South Central Asian"),
            &[
                "indian", "india", "tandoor", "curry", "masala", "patel brothers",
                "deshi bazzar", "halal", "pakistan", "bangladeshi", "desi", "rasaili rai",
                "nepal", "sri lanka",
            ],
        ),
        // ── Asia: Western ───────────────────────────────────────────
        entry(
            "Middle Eastern",
            "Asia",
            "Western Asia",
            Some("Multiple Western Asian"),
            &[
                "mediterranean", "middle east", "kebab", "gyro", "shawarma", "lebanese",
                "persian", "afghan", "anatolia", "zabiha", "king zabiha", "al markaz",
                "arab", "falafel", "hummus", "georgian", "armenian",
            ],
        ),
        entry(
            "Asian (General)",
            "Asia",
            "General",
            None,
            &["asian", "asia", "99 ranch", "hiep", "cocohodo"],
        ),
        // ── Africa ──────────────────────────────────────────────────
        entry(
            "African",
            "Africa",
            "Multiple African Regions",
            Some("Multiple African"),
            &[
                "african", "ethiopian", "nigerian", "habesha", "injera", "somali",
                "abyssinia", "harar", "senga", "sega", "kenkey", "eritrean", "jollof",
            ],
        ),
        // ── Europe ──────────────────────────────────────────────────
        entry(
            "Eastern European",
            "Europe",
            "Eastern Europe",
            Some("Multiple Eastern European"),
            &[
                "polish", "russia", "russian", "ukraine", "ukrainian",
                "eastern european", "pierogi", "borscht",
            ],
        ),
        entry(
            "Italian",
            "Europe",
            "Southern Europe",
            Some("Italy"),
            &[
                "italian", "italy", "pizza", "pasta", "calzone", "pizzeria", "romas",
                "sicily", "domino's",
            ],
        ),
        // ── Consolidated non-ethnic keywords ────────────────────────
        // Everything below the ethnic entries so the ethnic match always
        // takes priority for shared phrases.
        keyword_group(
            GENERAL_RETAIL,
            &[
                // seafood
                "seafood", "fish", "oyster", "shrimp", "crawfish", "crab",
                // bakery, dessert, sweets
                "bakery", "donut", "donuts", "cake", "cakes", "sweet", "sweets",
                "ice cream", "dessert", "kolache", "candy", "cupcake", "pastry",
                "creamery", "custard", "bundt", "macaron", "chocolate", "frozen custard",
                "shaved ice", "frostbite", "frostbites", "gelato", "frosty",
                "artisan pops", "praline", "gourmet gifts", "toffee", "dounts",
                "doughnuts", "creamistry", "hypnotic", "sprinkles", "baskin robbins",
                "dunkin", "shipley", "popcorn", "corn shoppe", "cookies",
                "edible arrangements", "bakeshop", "velvet whisk", "bakes", "treetz",
                "treats", "van leeuwen", "laderach", "kokopelli", "macarons",
                "banana bread", "bakers dozen", "confection", "snacks", "daylight",
                "cajun donuts", "yum", "yummy", "yumilicious",
                // juice, smoothie, coffee
                "juice", "jamba", "smoothie", "pressed", "coffee", "espresso",
                "ascension", "graph coffee", "drip coffee", "tea company", "drip",
                // specialty and gourmet
                "spice", "trading company", "spices", "gourmet", "olive", "vinegar",
                "extract", "extracts", "syrup", "syrups", "whole foods", "sprouts",
                "market street", "central market", "penzeys", "stocks & bondy",
                "infused oils", "saladmaster", "omaha steaks", "scardello", "jam",
                "jams", "pepper palace", "canning", "charcuterie", "queso",
                "southern spoon", "feeding souls", "french garden", "fireworks",
                "firecrackers", "botanist brewer", "ginger beer", "booze baggers",
                "beyond booze", "marketplace", "boxed bites", "bits", "bites",
                "deli", "sub", "subway",
                // butcher, meat market, smokehouse
                "meat market", "butcher", "meat", "sausage", "renko sausage",
                "classic meat", "smokehouse", "baby back", "bbq", "barbeque",
                // prepared foods, catering, wellness
                "catering", "prepared", "kitchen", "mama technologies",
                "chuchu grocery & catering", "snap kitchen", "diabetes health",
                "wellness", "cbd", "kratom",
                // vending, convenience services, international grocery
                "vending", "ice vending", "water", "sparkletts", "aqua bella",
                "rapido ice", "luxury inn", "dallas vending", "jubel vending",
                "frutihielo", "mundos ice", "international", "import", "global",
                "uac international", "globex", "wrights family food", "jtc bless",
                "komart", "hope & faith international",
                // major grocery chains
                "kroger", "walmart", "target", "costco", "sam's club", "aldi",
                "food lion", "foodland", "cash saver", "crest foods",
                // convenience and gas stations
                "braum's", "shell", "exxon", "7-eleven", "chevron", "bp", "valero",
                "racetrac", "qt", "quiktrip", "stop-n-go", "food mart", "beverage",
                "convenience", "gas",
                // discount, dollar stores, chain pharmacies
                "dollar general", "dollar tree", "family dollar", "savers cost plus",
                "malone's cost plus", "99 cent", "discount", "dollartree", "cvs",
                "walgreens", "rite aid",
                // general grocery, markets, farm stands
                "grocery", "market", "superstore", "food store", "richland market",
                "jimmy's food", "az food", "dallas superstore", "tailoring & grocery",
                "mac arthur irving", "addison", "carnival", "mecato market",
                "supermarket", "farm", "farms", "farmer", "farmers", "orchard",
                "produce", "kelley produce",
                // religious, cultural, non-food
                "libreria catolica", "san judas", "religious", "cultural", "medical",
                "jewelry", "tailoring", "bead",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ethnic_entries_precede_the_keyword_group() {
        let entries = builtin_entries();
        assert_eq!(entries.last().unwrap().label, GENERAL_RETAIL);
        assert!(entries.last().unwrap().region.is_none());
        // 18 ethnic/regional entries plus the consolidated group.
        assert_eq!(entries.len(), 19);
    }

    #[test]
    fn korean_is_listed_before_general_bbq() {
        let entries = builtin_entries();
        let korean = entries.iter().position(|e| e.label == "Korean").unwrap();
        let general = entries.iter().position(|e| e.label == GENERAL_RETAIL).unwrap();
        assert!(korean < general);
        assert!(entries[korean].triggers.iter().any(|t| t == "bbq"));
        assert!(entries[general].triggers.iter().any(|t| t == "bbq"));
    }

    #[test]
    fn all_triggers_are_lowercase() {
        for e in builtin_entries() {
            for t in &e.triggers {
                assert_eq!(*t, t.to_lowercase(), "trigger '{t}' in '{}'", e.label);
            }
        }
    }
}
