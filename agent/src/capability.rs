use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Named tools a task may enable. The names are what ends up in the
/// `tools:` list of a task document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Web search, answered by a search-preview model.
    InternetSearch,
    /// Key/value scratch memory the agent can list, read and write.
    Memory,
}

impl Capability {
    pub fn all() -> &'static [Capability] {
        &[Capability::InternetSearch, Capability::Memory]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Capability::InternetSearch => "InternetSearchTool",
            Capability::Memory => "MemoryTool",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Capability::InternetSearch => {
                "Search Internet for relevant information based on a query or latest news"
            }
            Capability::Memory => "Store and recall intermediate findings by key",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Capability {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Capability::all()
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| Error::ToolDoesNotExist(s.to_string()))
    }
}
