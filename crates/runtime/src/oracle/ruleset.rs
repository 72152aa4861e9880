use std::collections::HashMap;
use std::path::Path;

use battle_core::{ItemRule, RulesetOracle};

use crate::api::{Result, RuntimeError};

const EMBEDDED_ITEMS: &str = include_str!("../../data/items.ron");

/// Item rules held in memory, keyed by id.
#[derive(Clone, Debug, Default)]
pub struct StaticRuleset {
    items: HashMap<String, ItemRule>,
}

impl StaticRuleset {
    pub fn from_rules(rules: impl IntoIterator<Item = ItemRule>) -> Self {
        Self {
            items: rules
                .into_iter()
                .map(|rule| (rule.id.clone(), rule))
                .collect(),
        }
    }

    /// Parses a RON list of item rules.
    pub fn from_ron_str(content: &str, origin: &str) -> Result<Self> {
        let rules: Vec<ItemRule> = ron::from_str(content).map_err(|source| RuntimeError::Parse {
            origin: origin.to_owned(),
            source,
        })?;
        Ok(Self::from_rules(rules))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RuntimeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&content, &path.display().to_string())
    }

    /// Rules shipped with the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_ron_str(EMBEDDED_ITEMS, "embedded items.ron")
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn insert(&mut self, rule: ItemRule) {
        self.items.insert(rule.id.clone(), rule);
    }
}

impl RulesetOracle for StaticRuleset {
    fn item(&self, id: &str) -> Option<&ItemRule> {
        self.items.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{BattleType, DamageType};

    #[test]
    fn embedded_rules_parse() {
        let ruleset = StaticRuleset::embedded().unwrap();
        let rifle = ruleset.item("rifle").unwrap();
        assert_eq!(rifle.battle_type, BattleType::Firearm);
        assert!(rifle.tu_snap > 0);
        let grenade = ruleset.item("grenade").unwrap();
        assert!(grenade.battle_type.is_grenade());
        assert_eq!(grenade.damage_type, DamageType::Explosive);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let ruleset =
            StaticRuleset::from_ron_str(r#"[(id: "knife", battle_type: Melee, tu_melee: 20)]"#, "inline")
                .unwrap();
        let knife = ruleset.item("knife").unwrap();
        assert_eq!(knife.tu_melee, 20);
        assert_eq!(knife.power, 0);
        assert!(ruleset.item("rifle").is_none());
    }

    #[test]
    fn malformed_rules_are_reported() {
        let err = StaticRuleset::from_ron_str("[(id: 3)]", "inline").unwrap_err();
        assert!(matches!(err, RuntimeError::Parse { .. }));
    }
}
