use std::sync::Arc;

use am4_database::{DbError, UserChanges, UserRecord, UserStore};
use tracing::info;

use crate::error::SettingsError;

const MAX_WEAR_TRAINING: i32 = 5;
const MAX_REPAIR_TRAINING: i32 = 5;
const MAX_L_TRAINING: i32 = 6;
const MAX_H_TRAINING: i32 = 6;
const MAX_FUEL_TRAINING: i32 = 3;
const MAX_CO2_TRAINING: i32 = 5;
const MAX_FUEL_PRICE: i32 = 3000;
const MAX_CO2_PRICE: i32 = 200;

fn check_range(field: &str, value: Option<i32>, max: i32) -> Result<(), SettingsError> {
    match value {
        Some(value) if !(0..=max).contains(&value) => Err(SettingsError::Invalid(format!(
            "{field} must be between 0 and {max}, got {value}"
        ))),
        _ => Ok(()),
    }
}

/// Reject change sets that would put a user outside the game's limits.
pub fn validate_changes(changes: &UserChanges) -> Result<(), SettingsError> {
    if changes.is_empty() {
        return Err(SettingsError::Invalid("no settings to update".to_owned()));
    }

    check_range("wear_training", changes.wear_training, MAX_WEAR_TRAINING)?;
    check_range("repair_training", changes.repair_training, MAX_REPAIR_TRAINING)?;
    check_range("l_training", changes.l_training, MAX_L_TRAINING)?;
    check_range("h_training", changes.h_training, MAX_H_TRAINING)?;
    check_range("fuel_training", changes.fuel_training, MAX_FUEL_TRAINING)?;
    check_range("co2_training", changes.co2_training, MAX_CO2_TRAINING)?;
    check_range("fuel_price", changes.fuel_price, MAX_FUEL_PRICE)?;
    check_range("co2_price", changes.co2_price, MAX_CO2_PRICE)?;
    check_range("accumulated_count", changes.accumulated_count, i32::MAX)?;

    if let Some(load) = changes.load {
        if !(load > 0.0 && load <= 1.0) {
            return Err(SettingsError::Invalid(format!(
                "load must be in (0, 1], got {load}"
            )));
        }
    }
    if let Some(tolerance) = changes.income_loss_tol {
        if !(0.0..=1.0).contains(&tolerance) {
            return Err(SettingsError::Invalid(format!(
                "income_loss_tol must be in [0, 1], got {tolerance}"
            )));
        }
    }

    Ok(())
}

/// Validated profile updates. Hooks registered on the store fire on success.
#[derive(Debug)]
pub struct UserSettingsService {
    store: Arc<dyn UserStore>,
}

impl UserSettingsService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: i64,
        changes: &UserChanges,
    ) -> Result<UserRecord, SettingsError> {
        validate_changes(changes)?;

        let user = self.store.update(id, changes).await.map_err(|e| match e {
            DbError::NotFound(_) => SettingsError::UserNotFound(id),
            other => SettingsError::Database(other),
        })?;

        info!(user_id = user.id, "user settings updated");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use am4_database::store::MemoryUserStore;
    use am4_database::{DbError, NewUser, Role, UserChanges, UserStore};

    use super::{UserSettingsService, validate_changes};
    use crate::error::SettingsError;

    fn invalid(changes: UserChanges) -> bool {
        matches!(validate_changes(&changes), Err(SettingsError::Invalid(_)))
    }

    #[test]
    fn bounds_follow_the_game_limits() {
        assert!(invalid(UserChanges::default()));
        assert!(invalid(UserChanges {
            wear_training: Some(6),
            ..UserChanges::default()
        }));
        assert!(invalid(UserChanges {
            l_training: Some(7),
            ..UserChanges::default()
        }));
        assert!(invalid(UserChanges {
            fuel_training: Some(4),
            ..UserChanges::default()
        }));
        assert!(invalid(UserChanges {
            co2_price: Some(201),
            ..UserChanges::default()
        }));
        assert!(invalid(UserChanges {
            fuel_price: Some(-1),
            ..UserChanges::default()
        }));
        assert!(invalid(UserChanges {
            load: Some(0.0),
            ..UserChanges::default()
        }));
        assert!(invalid(UserChanges {
            load: Some(f64::NAN),
            ..UserChanges::default()
        }));
        assert!(invalid(UserChanges {
            income_loss_tol: Some(1.5),
            ..UserChanges::default()
        }));

        let at_limits = UserChanges {
            wear_training: Some(5),
            h_training: Some(6),
            fuel_training: Some(3),
            fuel_price: Some(3000),
            co2_price: Some(200),
            load: Some(1.0),
            income_loss_tol: Some(0.0),
            ..UserChanges::default()
        };
        assert!(validate_changes(&at_limits).is_ok());
    }

    #[tokio::test]
    async fn updates_persist_and_unknown_users_are_reported() {
        let store = Arc::new(MemoryUserStore::new());
        let user = store
            .create(&NewUser::from_discord("pilot", "Air", "EASY", 1, "hash"))
            .await
            .unwrap();
        let settings = UserSettingsService::new(store.clone());

        let changes = UserChanges {
            role: Some(Role::TrustedUser),
            fourx: Some(true),
            ..UserChanges::default()
        };
        let updated = settings.update(user.id, &changes).await.unwrap();
        assert_eq!(updated.role, Role::TrustedUser);
        assert!(updated.fourx);

        let err = settings.update(user.id + 1, &changes).await.unwrap_err();
        assert!(matches!(err, SettingsError::UserNotFound(id) if id == user.id + 1));
    }

    #[tokio::test]
    async fn invalid_changes_never_reach_the_store() {
        let store = Arc::new(MemoryUserStore::new());
        let user = store
            .create(&NewUser::from_discord("pilot", "Air", "EASY", 1, "hash"))
            .await
            .unwrap();
        let settings = UserSettingsService::new(store.clone());

        let changes = UserChanges {
            co2_training: Some(9),
            ..UserChanges::default()
        };
        settings.update(user.id, &changes).await.unwrap_err();

        let stored = store.find_by_id(user.id).await.unwrap().into_option().unwrap();
        assert_eq!(stored.co2_training, 0);
    }

    #[tokio::test]
    async fn discord_id_clashes_surface_as_database_errors() {
        let store = Arc::new(MemoryUserStore::new());
        store
            .create(&NewUser::from_discord("first", "Air", "EASY", 1, "hash"))
            .await
            .unwrap();
        let second = store
            .create(&NewUser::from_discord("second", "Air", "EASY", 2, "hash"))
            .await
            .unwrap();

        let changes = UserChanges {
            discord_id: Some(1),
            ..UserChanges::default()
        };
        let err = UserSettingsService::new(store)
            .update(second.id, &changes)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Database(DbError::DuplicateDiscordId(1))
        ));
    }
}
