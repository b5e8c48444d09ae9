use anyhow::{anyhow, bail, Result};
use checkpoint::DeltaExtractor;

/// Default clock of the simulated system, in Hz
pub const DEFAULT_FREQUENCY_HZ: f64 = 2_800_000_000.0;

/// Default report order, matching the simulator's component names
pub const DEFAULT_COMPONENTS: &[&str] = &["c", "l1d", "l1i", "l2", "llc", "memctrl", "DRAM"];

pub const LINE_SIZE_BYTES: i64 = 64;
pub const PAGE_SIZE_BYTES: i64 = 4 * 1024;

/// Hardware component types that have a deriver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Core,
    /// Any cache level; first-level caches also count filter-cache hits
    Cache { first_level: bool },
    MemoryController,
    Dram,
}

impl ComponentKind {
    /// Classifies a component by the name the simulator configuration gives it
    pub fn classify(name: &str) -> Option<Self> {
        match name {
            "c" => Some(Self::Core),
            "l1i" | "l1d" => Some(Self::Cache { first_level: true }),
            "l2" | "llc" => Some(Self::Cache { first_level: false }),
            "memctrl" => Some(Self::MemoryController),
            "DRAM" => Some(Self::Dram),
            _ => None,
        }
    }
}

/// A component to report on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSpec {
    pub name: String,
    pub kind: ComponentKind,
}

impl ComponentSpec {
    pub fn parse(name: &str) -> Result<Self> {
        let kind =
            ComponentKind::classify(name).ok_or_else(|| anyhow!("Undefined component {}", name))?;
        Ok(Self {
            name: name.to_string(),
            kind,
        })
    }
}

/// Fractional digits used when pretty-printing each kind of figure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision {
    /// Every derived per-component or misc metric
    pub metric: usize,
    /// Whole-run instruction count
    pub instructions: usize,
    /// Number of checkpoints
    pub checkpoints: usize,
    /// The warm-up fraction, shown as a percentage
    pub warmup: usize,
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            metric: 2,
            instructions: 1,
            checkpoints: 0,
            warmup: 1,
        }
    }
}

/// Immutable settings shared by every deriver during a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub components: Vec<ComponentSpec>,
    pub system_frequency_hz: f64,
    pub extractor: DeltaExtractor,
    pub pretty: bool,
    pub precision: Precision,
    pub line_size_bytes: i64,
    pub page_size_bytes: i64,
}

impl Default for RunConfig {
    fn default() -> Self {
        let components = DEFAULT_COMPONENTS
            .iter()
            .filter_map(|name| ComponentSpec::parse(name).ok())
            .collect();

        Self {
            components,
            system_frequency_hz: DEFAULT_FREQUENCY_HZ,
            extractor: DeltaExtractor::default(),
            pretty: false,
            precision: Precision::default(),
            line_size_bytes: LINE_SIZE_BYTES,
            page_size_bytes: PAGE_SIZE_BYTES,
        }
    }
}

impl RunConfig {
    /// Builds a configuration, rejecting anything that would make every file fail
    pub fn new<S: AsRef<str>>(
        component_names: &[S],
        warmup_fraction: f64,
        system_frequency_hz: f64,
        pretty: bool,
    ) -> Result<Self> {
        let components = component_names
            .iter()
            .map(|name| ComponentSpec::parse(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        if !components.iter().any(|c| c.kind == ComponentKind::Core) {
            bail!("At least one core component must be configured");
        }

        if !(system_frequency_hz.is_finite() && system_frequency_hz > 0.0) {
            bail!("System frequency must be positive, got {}", system_frequency_hz);
        }

        let extractor = DeltaExtractor::new(warmup_fraction)?;

        Ok(Self {
            components,
            system_frequency_hz,
            extractor,
            pretty,
            ..Self::default()
        })
    }

    pub fn warmup_fraction(&self) -> f64 {
        self.extractor.warmup_fraction()
    }

    /// The component whose checkpoints and instructions describe the whole run
    pub fn core(&self) -> Option<&ComponentSpec> {
        self.components
            .iter()
            .find(|c| c.kind == ComponentKind::Core)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("c", ComponentKind::Core)]
    #[case("l1i", ComponentKind::Cache { first_level: true })]
    #[case("l1d", ComponentKind::Cache { first_level: true })]
    #[case("l2", ComponentKind::Cache { first_level: false })]
    #[case("llc", ComponentKind::Cache { first_level: false })]
    #[case("memctrl", ComponentKind::MemoryController)]
    #[case("DRAM", ComponentKind::Dram)]
    fn test_classify(#[case] name: &str, #[case] expected: ComponentKind) {
        assert_eq!(ComponentKind::classify(name), Some(expected));
    }

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        let names: Vec<_> = config.components.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, DEFAULT_COMPONENTS);
        assert_eq!(config.warmup_fraction(), 0.0);
        assert!(!config.pretty);
        assert_eq!(config.core().map(|c| c.name.as_str()), Some("c"));
    }

    #[test]
    fn test_unknown_component_is_fatal() {
        let result = RunConfig::new(&["c", "l3"], 0.0, DEFAULT_FREQUENCY_HZ, false);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Undefined component l3"));
    }

    #[test]
    fn test_core_required() {
        assert!(RunConfig::new(&["l1d", "DRAM"], 0.0, DEFAULT_FREQUENCY_HZ, false).is_err());
    }

    #[rstest]
    #[case(1.0, DEFAULT_FREQUENCY_HZ)]
    #[case(-0.5, DEFAULT_FREQUENCY_HZ)]
    #[case(0.2, 0.0)]
    fn test_invalid_numbers_rejected(#[case] warmup: f64, #[case] frequency: f64) {
        assert!(RunConfig::new(&["c"], warmup, frequency, false).is_err());
    }

    #[test]
    fn test_custom_config() {
        let config = RunConfig::new(&["c", "llc"], 0.5, 1e9, true).unwrap();

        assert_eq!(config.components.len(), 2);
        assert_eq!(config.warmup_fraction(), 0.5);
        assert_eq!(config.system_frequency_hz, 1e9);
        assert!(config.pretty);
        assert_eq!(config.line_size_bytes, 64);
        assert_eq!(config.page_size_bytes, 4096);
    }
}
