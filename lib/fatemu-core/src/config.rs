use serde::Deserialize;

/// What `create_file` does when an entry with the same name exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateNames {
    /// Replace the existing entry; its old blocks are freed first.
    #[default]
    Overwrite,
    /// Fail with a validation error.
    Reject,
}

/// Engine settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// The longest chain the engine will walk or write. A walk that goes
    /// further is reported as a broken (probably cyclic) chain.
    pub max_chain_hops: usize,
    pub duplicate_names: DuplicateNames,
    /// Whether a file sitting in the trash may be rewritten.
    pub rewrite_trashed: bool,
}

impl Config {
    pub const DEFAULT_MAX_CHAIN_HOPS: usize = 65536;
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_chain_hops: Self::DEFAULT_MAX_CHAIN_HOPS,
            duplicate_names: DuplicateNames::Overwrite,
            rewrite_trashed: true,
        }
    }
}
