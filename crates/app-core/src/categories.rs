//! Event categories
//!
//! Posts are filed under one of a fixed set of campus event categories.

use serde::Serialize;

/// An event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Category {
    /// Stable id
    pub id: u8,
    /// Display name, also the value stored on posts
    pub name: &'static str,
    /// Emoji shown next to the name
    pub icon: &'static str,
}

/// Every selectable category, in display order
pub const CATEGORIES: [Category; 6] = [
    Category { id: 1, name: "Placements", icon: "👨‍💼" },
    Category { id: 2, name: "Workshops", icon: "🛠️" },
    Category { id: 3, name: "Hackathon", icon: "🚀" },
    Category { id: 4, name: "Festivals", icon: "🎉" },
    Category { id: 5, name: "Sports", icon: "🏅" },
    Category { id: 6, name: "Other", icon: "✨" },
];

/// Category used when a post has none
pub const DEFAULT_CATEGORY: Category = CATEGORIES[5];

impl Category {
    /// Look up a category by id
    pub fn by_id(id: u8) -> Option<Category> {
        CATEGORIES.iter().copied().find(|c| c.id == id)
    }

    /// Look up a category by its exact name
    pub fn by_name(name: &str) -> Option<Category> {
        CATEGORIES.iter().copied().find(|c| c.name == name)
    }

    /// All categories
    pub fn all() -> &'static [Category] {
        &CATEGORIES
    }
}

impl Default for Category {
    fn default() -> Self {
        DEFAULT_CATEGORY
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.icon, self.name)
    }
}
