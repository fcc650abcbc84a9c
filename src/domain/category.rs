use std::fmt;

/// Categories offered when no category file exists yet.
pub const DEFAULT_CATEGORIES: [&str; 10] = [
    "Food",
    "Transport",
    "Entertainment",
    "Household",
    "Medical",
    "Rent",
    "Utilities",
    "Income",
    "Investment",
    "Clothing",
];

/// Flat, ordered set of category names offered to the user.
///
/// The set is independent of the records: removing a name here never changes
/// the `category` text of existing records, and records may use names that are
/// not in the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    names: Vec<String>,
}

impl CategorySet {
    pub fn new() -> Self {
        Self { names: Vec::new() }
    }

    pub fn defaults() -> Self {
        Self {
            names: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Parse the newline-delimited file format. Lines are trimmed, blank
    /// lines and repeated names are dropped.
    pub fn from_lines(text: &str) -> Self {
        let mut set = Self::new();
        for line in text.lines() {
            let _ = set.insert(line);
        }
        set
    }

    /// Render the newline-delimited file format.
    pub fn to_lines(&self) -> String {
        let mut out = String::new();
        for name in &self.names {
            out.push_str(name);
            out.push('\n');
        }
        out
    }

    /// Append a category. Returns the trimmed name that was stored.
    pub fn insert(&mut self, name: &str) -> Result<String, CategoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CategoryError::Blank);
        }
        if self.contains(name) {
            return Err(CategoryError::Duplicate(name.to_string()));
        }
        self.names.push(name.to_string());
        Ok(name.to_string())
    }

    pub fn remove(&mut self, name: &str) -> Result<(), CategoryError> {
        let name = name.trim();
        let pos = self
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| CategoryError::NotFound(name.to_string()))?;
        self.names.remove(pos);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self::defaults()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryError {
    Blank,
    Duplicate(String),
    NotFound(String),
}

impl fmt::Display for CategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryError::Blank => write!(f, "Category name cannot be blank"),
            CategoryError::Duplicate(name) => write!(f, "Category already exists: {}", name),
            CategoryError::NotFound(name) => write!(f, "Category not found: {}", name),
        }
    }
}

impl std::error::Error for CategoryError {}
