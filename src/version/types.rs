//! Common types shared by the fetcher, bumper and release pipeline

use std::fmt;

/// SDK language released by this tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    /// PyPI package
    Python,
    /// npm package
    TypeScript,
    /// Go module
    Go,
    /// Maven artifact
    Java,
}

impl Language {
    /// Every language, in release order
    pub const ALL: [Language; 4] = [
        Language::Python,
        Language::TypeScript,
        Language::Go,
        Language::Java,
    ];

    /// Returns the identifier used in tag names and generator groups
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::TypeScript => "typescript",
            Language::Go => "go",
            Language::Java => "java",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" => Ok(Language::Python),
            "typescript" => Ok(Language::TypeScript),
            "go" => Ok(Language::Go),
            "java" => Ok(Language::Java),
            other => Err(format!("unknown language: {other}")),
        }
    }
}

/// Languages targeted by one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageSelection {
    One(Language),
    All,
}

impl LanguageSelection {
    pub fn languages(&self) -> Vec<Language> {
        match self {
            LanguageSelection::One(language) => vec![*language],
            LanguageSelection::All => Language::ALL.to_vec(),
        }
    }
}

impl std::str::FromStr for LanguageSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(LanguageSelection::All);
        }
        s.parse().map(LanguageSelection::One)
    }
}

/// Semantic version component to increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpType {
    Major,
    Minor,
    Patch,
}

impl BumpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpType::Major => "major",
            BumpType::Minor => "minor",
            BumpType::Patch => "patch",
        }
    }
}

impl fmt::Display for BumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BumpType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "major" => Ok(BumpType::Major),
            "minor" => Ok(BumpType::Minor),
            "patch" => Ok(BumpType::Patch),
            other => Err(format!("unknown bump type: {other}")),
        }
    }
}
