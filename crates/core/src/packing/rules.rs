//! Keyword tables that turn a trip description into packing items.

/// How a table reacts when several of its rules match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Only the first matching rule in table order contributes.
    FirstMatch,
    /// Every matching rule contributes, in table order.
    AllMatches,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeywordRule {
    pub keywords: &'static [&'static str],
    pub items: &'static [&'static str],
}

impl KeywordRule {
    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|keyword| text.contains(keyword))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeywordTable {
    pub name: &'static str,
    pub policy: MatchPolicy,
    pub rules: &'static [KeywordRule],
}

impl KeywordTable {
    /// Items contributed by this table for already lower-cased `text`.
    pub fn items_for(&self, text: &str) -> Vec<&'static str> {
        let mut matching = self.rules.iter().filter(|rule| rule.matches(text));
        match self.policy {
            MatchPolicy::FirstMatch => {
                matching.next().map(|rule| rule.items.to_vec()).unwrap_or_default()
            }
            MatchPolicy::AllMatches => {
                matching.flat_map(|rule| rule.items.iter().copied()).collect()
            }
        }
    }
}

pub const BASE_ITEMS: &[&str] =
    &["travel backpack", "phone charger", "toiletry bag", "travel adapter"];

/// `weekend` contains `week`, so weekend trips land in the long-trip branch.
pub const DURATION_TABLE: KeywordTable = KeywordTable {
    name: "duration",
    policy: MatchPolicy::FirstMatch,
    rules: &[
        KeywordRule {
            keywords: &["week", "7 day", "long trip"],
            items: &["laundry detergent pods", "extra underwear", "medication organizer"],
        },
        KeywordRule {
            keywords: &["weekend", "2 day", "3 day", "short trip"],
            items: &["travel size toiletries", "compact packing cubes"],
        },
    ],
};

pub const CLIMATE_TABLE: KeywordTable = KeywordTable {
    name: "climate",
    policy: MatchPolicy::FirstMatch,
    rules: &[
        KeywordRule {
            keywords: &["tropical"],
            items: &[
                "sunscreen SPF 50",
                "insect repellent",
                "lightweight clothing",
                "sandals",
                "sun hat",
            ],
        },
        KeywordRule {
            keywords: &["beach"],
            items: &["swimsuit", "beach towel", "waterproof phone case", "flip flops", "beach bag"],
        },
        KeywordRule {
            keywords: &["cold"],
            items: &["thermal underwear", "winter jacket", "warm gloves", "beanie", "wool socks"],
        },
        KeywordRule {
            keywords: &["mountain"],
            items: &["hiking boots", "rain jacket", "first aid kit", "headlamp", "trekking poles"],
        },
        KeywordRule {
            keywords: &["city"],
            items: &["comfortable walking shoes", "day pack", "portable charger", "city guidebook"],
        },
        KeywordRule {
            keywords: &["business"],
            items: &[
                "business attire",
                "laptop bag",
                "dress shoes",
                "iron travel size",
                "business cards",
            ],
        },
        KeywordRule {
            keywords: &["camping"],
            items: &[
                "sleeping bag",
                "camping tent",
                "camping stove",
                "water purification tablets",
                "multi-tool",
            ],
        },
    ],
};

pub const ACTIVITY_TABLE: KeywordTable = KeywordTable {
    name: "activity",
    policy: MatchPolicy::AllMatches,
    rules: &[
        KeywordRule {
            keywords: &["photography"],
            items: &["camera equipment", "extra batteries", "memory cards", "lens cleaning kit"],
        },
        KeywordRule {
            keywords: &["fitness"],
            items: &["workout clothes", "running shoes", "fitness tracker", "protein bars"],
        },
        KeywordRule {
            keywords: &["cooking"],
            items: &["portable cooking set", "spices travel kit", "cooler bag", "cutting board"],
        },
        KeywordRule {
            keywords: &["reading"],
            items: &["e-reader", "reading light", "book stand", "blue light glasses"],
        },
    ],
};

/// Tables applied after the base items, in this order.
pub const PACKING_TABLES: &[KeywordTable] = &[DURATION_TABLE, CLIMATE_TABLE, ACTIVITY_TABLE];
