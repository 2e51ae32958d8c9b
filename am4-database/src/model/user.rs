use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_TRAINING: i32 = 0;
pub const DEFAULT_FUEL_PRICE: i32 = 700;
pub const DEFAULT_CO2_PRICE: i32 = 120;
pub const DEFAULT_ACCUMULATED_COUNT: i32 = 0;
pub const DEFAULT_LOAD: f64 = 0.87;
pub const DEFAULT_INCOME_LOSS_TOL: f64 = 0.1;

/// Access level of a user. Stored as its upper-case name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    User,
    TrustedUser,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::TrustedUser => "TRUSTED_USER",
            Self::Admin => "ADMIN",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "USER" => Some(Self::User),
            "TRUSTED_USER" => Some(Self::TrustedUser),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted user. The credential hash never leaves the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub game_id: i64,
    pub game_name: String,
    pub game_mode: String,
    pub discord_id: i64,
    pub wear_training: i32,
    pub repair_training: i32,
    pub l_training: i32,
    pub h_training: i32,
    pub fuel_training: i32,
    pub co2_training: i32,
    pub fuel_price: i32,
    pub co2_price: i32,
    pub accumulated_count: i32,
    pub load: f64,
    pub income_loss_tol: f64,
    pub fourx: bool,
    pub role: Role,
    pub verified: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Everything needed to insert a user row.
#[derive(Clone, Debug, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub game_id: i64,
    pub game_name: String,
    pub game_mode: String,
    pub discord_id: i64,
    pub wear_training: i32,
    pub repair_training: i32,
    pub l_training: i32,
    pub h_training: i32,
    pub fuel_training: i32,
    pub co2_training: i32,
    pub fuel_price: i32,
    pub co2_price: i32,
    pub accumulated_count: i32,
    pub load: f64,
    pub income_loss_tol: f64,
    pub fourx: bool,
    pub role: Role,
    pub verified: bool,
}

impl NewUser {
    /// Build a user for a first-time Discord caller. Every profile setting
    /// takes its default; only the identity fields come from the caller.
    pub fn from_discord(
        username: impl Into<String>,
        game_name: impl Into<String>,
        game_mode: impl Into<String>,
        discord_id: i64,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            game_id: 0,
            game_name: game_name.into(),
            game_mode: game_mode.into(),
            discord_id,
            wear_training: DEFAULT_TRAINING,
            repair_training: DEFAULT_TRAINING,
            l_training: DEFAULT_TRAINING,
            h_training: DEFAULT_TRAINING,
            fuel_training: DEFAULT_TRAINING,
            co2_training: DEFAULT_TRAINING,
            fuel_price: DEFAULT_FUEL_PRICE,
            co2_price: DEFAULT_CO2_PRICE,
            accumulated_count: DEFAULT_ACCUMULATED_COUNT,
            load: DEFAULT_LOAD,
            income_loss_tol: DEFAULT_INCOME_LOSS_TOL,
            fourx: false,
            role: Role::User,
            verified: true,
        }
    }

    /// Materialize the record a store hands back after a successful insert.
    pub fn into_record(self, id: i64, now: i64) -> UserRecord {
        UserRecord {
            id,
            username: self.username,
            email: None,
            game_id: self.game_id,
            game_name: self.game_name,
            game_mode: self.game_mode,
            discord_id: self.discord_id,
            wear_training: self.wear_training,
            repair_training: self.repair_training,
            l_training: self.l_training,
            h_training: self.h_training,
            fuel_training: self.fuel_training,
            co2_training: self.co2_training,
            fuel_price: self.fuel_price,
            co2_price: self.co2_price,
            accumulated_count: self.accumulated_count,
            load: self.load,
            income_loss_tol: self.income_loss_tol,
            fourx: self.fourx,
            role: self.role,
            verified: self.verified,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A partial update. `None` leaves the column untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserChanges {
    pub email: Option<String>,
    pub game_id: Option<i64>,
    pub game_name: Option<String>,
    pub game_mode: Option<String>,
    pub discord_id: Option<i64>,
    pub wear_training: Option<i32>,
    pub repair_training: Option<i32>,
    pub l_training: Option<i32>,
    pub h_training: Option<i32>,
    pub fuel_training: Option<i32>,
    pub co2_training: Option<i32>,
    pub fuel_price: Option<i32>,
    pub co2_price: Option<i32>,
    pub accumulated_count: Option<i32>,
    pub load: Option<f64>,
    pub income_loss_tol: Option<f64>,
    pub fourx: Option<bool>,
    pub role: Option<Role>,
    pub verified: Option<bool>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the change set to an in-memory record.
    pub fn apply_to(&self, user: &mut UserRecord) {
        if let Some(email) = &self.email {
            user.email = Some(email.clone());
        }
        if let Some(game_id) = self.game_id {
            user.game_id = game_id;
        }
        if let Some(game_name) = &self.game_name {
            user.game_name.clone_from(game_name);
        }
        if let Some(game_mode) = &self.game_mode {
            user.game_mode.clone_from(game_mode);
        }
        if let Some(discord_id) = self.discord_id {
            user.discord_id = discord_id;
        }
        if let Some(value) = self.wear_training {
            user.wear_training = value;
        }
        if let Some(value) = self.repair_training {
            user.repair_training = value;
        }
        if let Some(value) = self.l_training {
            user.l_training = value;
        }
        if let Some(value) = self.h_training {
            user.h_training = value;
        }
        if let Some(value) = self.fuel_training {
            user.fuel_training = value;
        }
        if let Some(value) = self.co2_training {
            user.co2_training = value;
        }
        if let Some(value) = self.fuel_price {
            user.fuel_price = value;
        }
        if let Some(value) = self.co2_price {
            user.co2_price = value;
        }
        if let Some(value) = self.accumulated_count {
            user.accumulated_count = value;
        }
        if let Some(value) = self.load {
            user.load = value;
        }
        if let Some(value) = self.income_loss_tol {
            user.income_loss_tol = value;
        }
        if let Some(value) = self.fourx {
            user.fourx = value;
        }
        if let Some(value) = self.role {
            user.role = value;
        }
        if let Some(value) = self.verified {
            user.verified = value;
        }
    }
}
