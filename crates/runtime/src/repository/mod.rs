//! Repository layer for dynamic runtime data.
//!
//! Repositories handle data that CHANGES while the server runs, which for
//! battles is only the settings overrides. Static content (monsters, tower
//! floors, dragon stages) is served by oracles, not repositories.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileSettingsRepository;
pub use memory::InMemorySettingsRepo;
pub use traits::{SettingsMap, SettingsRepository, SettingsScope};

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{BattleType, SettingKey};
    use serde_json::json;

    fn exercise(repo: &dyn SettingsRepository) {
        let raid = SettingsScope::Battle(BattleType::Raid);
        assert_eq!(repo.get(raid, SettingKey::MaxTurns).unwrap(), None);

        repo.put(raid, SettingKey::MaxTurns, &json!(120)).unwrap();
        repo.put(SettingsScope::Global, SettingKey::LuckEffects, &json!(true)).unwrap();
        assert_eq!(repo.get(raid, SettingKey::MaxTurns).unwrap(), Some(json!(120)));
        assert_eq!(repo.load_all().unwrap().len(), 2);

        assert!(repo.delete(raid, SettingKey::MaxTurns).unwrap());
        assert!(!repo.delete(raid, SettingKey::MaxTurns).unwrap());
        assert!(!repo.load_all().unwrap().contains_key(&raid));
    }

    #[test]
    fn memory_repository_round_trip() {
        exercise(&InMemorySettingsRepo::new());
    }

    #[test]
    fn file_repository_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        exercise(&FileSettingsRepository::new(dir.path().join("settings.json")).unwrap());
    }

    #[test]
    fn file_repository_is_visible_to_a_second_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let writer = FileSettingsRepository::new(&path).unwrap();
        let reader = FileSettingsRepository::new(&path).unwrap();

        writer
            .put(SettingsScope::Battle(BattleType::CoopTower), SettingKey::AllowPets, &json!(false))
            .unwrap();
        assert_eq!(
            reader
                .get(SettingsScope::Battle(BattleType::CoopTower), SettingKey::AllowPets)
                .unwrap(),
            Some(json!(false))
        );

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"coop_tower\""));
    }

    #[test]
    fn corrupted_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let repo = FileSettingsRepository::new(&path).unwrap();
        assert!(matches!(repo.load_all(), Err(RepositoryError::CorruptedData(_))));
    }

    #[test]
    fn scope_tags_parse() {
        assert_eq!("global".parse::<SettingsScope>(), Ok(SettingsScope::Global));
        assert_eq!(
            "dragon".parse::<SettingsScope>(),
            Ok(SettingsScope::Battle(BattleType::Dragon))
        );
        assert!("arena".parse::<SettingsScope>().is_err());
    }
}
