//! fatctl config file. Every key but `version` is optional:
//!
//! ```toml
//! version = 1
//! store_dir = "fat-store"
//! max_chain_hops = 65536
//! duplicate_names = "overwrite" # or "reject"
//! rewrite_trashed = true
//! ```
use camino::{Utf8Path, Utf8PathBuf};
use fatemu_core::DuplicateNames;
use serde::Deserialize;

pub const DEFAULT_STORE_DIR: &str = "fat-store";

#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct ConfigV1 {
    version: u32, // Must be 1
    store_dir: Option<String>,
    max_chain_hops: Option<usize>,
    duplicate_names: Option<DuplicateNames>,
    rewrite_trashed: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub store_dir: Utf8PathBuf,
    pub engine: fatemu_core::Config,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: DEFAULT_STORE_DIR.into(),
            engine: fatemu_core::Config::default(),
        }
    }
}

impl Config {
    fn new(conf: ConfigV1) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(store_dir) = conf.store_dir {
            config.store_dir = store_dir.into();
        }
        if let Some(max_chain_hops) = conf.max_chain_hops {
            if max_chain_hops == 0 {
                anyhow::bail!("max_chain_hops must be positive.");
            }
            config.engine.max_chain_hops = max_chain_hops;
        }
        if let Some(duplicate_names) = conf.duplicate_names {
            config.engine.duplicate_names = duplicate_names;
        }
        if let Some(rewrite_trashed) = conf.rewrite_trashed {
            config.engine.rewrite_trashed = rewrite_trashed;
        }

        Ok(config)
    }
}

pub fn parse(toml_str: &str) -> anyhow::Result<Config> {
    let config_v1 = toml::from_str::<ConfigV1>(toml_str)?;
    if config_v1.version != 1 {
        anyhow::bail!("Unsupported config version.");
    }

    Config::new(config_v1)
}

pub fn read_from_file(path: &Utf8Path) -> anyhow::Result<Config> {
    let toml_str = std::fs::read_to_string(path)?;
    parse(&toml_str)
}

#[test]
fn basic_test() {
    let config = parse(
        r#"
        version = 1
        store_dir = '/tmp/fat'
        max_chain_hops = 12
        duplicate_names = 'reject'
        rewrite_trashed = false
    "#,
    )
    .unwrap();

    assert_eq!(Utf8Path::new("/tmp/fat"), config.store_dir);
    assert_eq!(12, config.engine.max_chain_hops);
    assert_eq!(DuplicateNames::Reject, config.engine.duplicate_names);
    assert!(!config.engine.rewrite_trashed);

    // Missing keys keep their defaults.
    assert_eq!(Config::default(), parse("version = 1").unwrap());

    assert!(parse("version = 2").is_err());
    assert!(parse("store_dir = 'x'").is_err());
    assert!(parse("version = 1\nmax_chain_hops = 0").is_err());
    assert!(parse("version = 1\nduplicate_names = 'sometimes'").is_err());
    assert!(parse("version = 1\nstore = 'typo'").is_err());
}
