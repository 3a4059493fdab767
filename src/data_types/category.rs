use serde::{Serialize, Serializer};

use crate::data_types::canteen::CategoryFamily;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StandardCategory {
    FleischUndFisch,
    PrimaKlima,
    Sattmacher,
    TopfUndPfanne,
    Extra,
    Beilagen,
    Salat,
    Desserts,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BistroCategory {
    PizzaI,
    PizzaII,
    PizzaIII,
    PastaI,
    PastaII,
}

/// A menu section. The variant is the canteen family, and the position
/// inside a family decides which PDF price slot a meal belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MealCategory {
    Standard(StandardCategory),
    Bistro(BistroCategory),
}

impl StandardCategory {
    /// Declaration order, which is also the PDF slot order.
    pub const ALL: [StandardCategory; 8] = [
        StandardCategory::FleischUndFisch,
        StandardCategory::PrimaKlima,
        StandardCategory::Sattmacher,
        StandardCategory::TopfUndPfanne,
        StandardCategory::Extra,
        StandardCategory::Beilagen,
        StandardCategory::Salat,
        StandardCategory::Desserts,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StandardCategory::FleischUndFisch => "Fleisch und Fisch",
            StandardCategory::PrimaKlima => "Prima Klima",
            StandardCategory::Sattmacher => "Sattmacher",
            StandardCategory::TopfUndPfanne => "Topf und Pfanne",
            StandardCategory::Extra => "Extra",
            StandardCategory::Beilagen => "Beilagen",
            StandardCategory::Salat => "Salat",
            StandardCategory::Desserts => "Desserts",
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            StandardCategory::FleischUndFisch => "fleisch und fisch",
            StandardCategory::PrimaKlima => "prima klima",
            StandardCategory::Sattmacher => "sattmacher",
            StandardCategory::TopfUndPfanne => "topf und pfanne",
            StandardCategory::Extra => "extra",
            StandardCategory::Beilagen => "beilage",
            StandardCategory::Salat => "salat",
            StandardCategory::Desserts => "dessert",
        }
    }
}

impl BistroCategory {
    pub const ALL: [BistroCategory; 5] = [
        BistroCategory::PizzaI,
        BistroCategory::PizzaII,
        BistroCategory::PizzaIII,
        BistroCategory::PastaI,
        BistroCategory::PastaII,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BistroCategory::PizzaI => "Pizza I",
            BistroCategory::PizzaII => "Pizza II",
            BistroCategory::PizzaIII => "Pizza III",
            BistroCategory::PastaI => "Pasta I",
            BistroCategory::PastaII => "Pasta II",
        }
    }
}

impl MealCategory {
    /// Parses a category header or label by keyword containment.
    ///
    /// Labels sharing a prefix are checked longest first, so "pizza iii"
    /// never ends up as "pizza i".
    pub fn from_label(label: &str) -> Option<MealCategory> {
        let cleaned = label
            .to_lowercase()
            .replace('_', " ")
            .replace(" & ", " und ");
        let cleaned = cleaned.trim();

        const BISTRO_PRIORITY: [(&str, BistroCategory); 5] = [
            ("pizza iii", BistroCategory::PizzaIII),
            ("pizza ii", BistroCategory::PizzaII),
            ("pizza i", BistroCategory::PizzaI),
            ("pasta ii", BistroCategory::PastaII),
            ("pasta i", BistroCategory::PastaI),
        ];

        if let Some((_, cat)) = BISTRO_PRIORITY
            .iter()
            .find(|(keyword, _)| cleaned.contains(keyword))
        {
            return Some(MealCategory::Bistro(*cat));
        }

        StandardCategory::ALL
            .into_iter()
            .find(|cat| cleaned.contains(cat.keyword()))
            .map(MealCategory::Standard)
    }

    /// Maps a 1-based PDF slot counter to the category at that position.
    pub fn from_ordinal(family: CategoryFamily, ordinal: usize) -> Option<MealCategory> {
        let index = ordinal.checked_sub(1)?;
        match family {
            CategoryFamily::Standard => StandardCategory::ALL
                .get(index)
                .copied()
                .map(MealCategory::Standard),
            CategoryFamily::Bistro => BistroCategory::ALL
                .get(index)
                .copied()
                .map(MealCategory::Bistro),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MealCategory::Standard(cat) => cat.label(),
            MealCategory::Bistro(cat) => cat.label(),
        }
    }
}

impl std::fmt::Display for MealCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for MealCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}
