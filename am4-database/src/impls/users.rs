use am4_utils::time::now_unix_secs;
use sqlx::{Postgres, QueryBuilder};

use crate::cache::{USER_CACHE_TTL, invalidate_users, user_discord_key};
use crate::database::Database;
use crate::error::{DbError, Result};
use crate::model::user::{NewUser, Role, UserChanges, UserRecord};

const DISCORD_ID_CONSTRAINT: &str = "users_discord_id_key";

const USER_COLUMNS: &str = "id, username, email, game_id, game_name, game_mode, discord_id, \
     wear_training, repair_training, l_training, h_training, fuel_training, co2_training, \
     fuel_price, co2_price, accumulated_count, load, income_loss_tol, fourx, role, verified, \
     created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: Option<String>,
    game_id: i64,
    game_name: String,
    game_mode: String,
    discord_id: i64,
    wear_training: i32,
    repair_training: i32,
    l_training: i32,
    h_training: i32,
    fuel_training: i32,
    co2_training: i32,
    fuel_price: i32,
    co2_price: i32,
    accumulated_count: i32,
    load: f64,
    income_loss_tol: f64,
    fourx: bool,
    role: String,
    verified: bool,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self> {
        let role = Role::parse(&row.role)
            .ok_or_else(|| DbError::Internal(format!("unknown role `{}`", row.role)))?;

        Ok(Self {
            id: row.id,
            username: row.username,
            email: row.email,
            game_id: row.game_id,
            game_name: row.game_name,
            game_mode: row.game_mode,
            discord_id: row.discord_id,
            wear_training: row.wear_training,
            repair_training: row.repair_training,
            l_training: row.l_training,
            h_training: row.h_training,
            fuel_training: row.fuel_training,
            co2_training: row.co2_training,
            fuel_price: row.fuel_price,
            co2_price: row.co2_price,
            accumulated_count: row.accumulated_count,
            load: row.load,
            income_loss_tol: row.income_loss_tol,
            fourx: row.fourx,
            role,
            verified: row.verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Map a failed write to a structured error. Unique violations are told apart
/// by constraint name so the caller can recover from a Discord id race.
fn classify_write_error(err: sqlx::Error, discord_id: i64) -> DbError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            match db_err.constraint() {
                Some(DISCORD_ID_CONSTRAINT) => DbError::DuplicateDiscordId(discord_id),
                Some(constraint) => {
                    DbError::Conflict(format!("unique constraint `{constraint}` violated"))
                }
                None => DbError::Conflict("unique constraint violated".to_owned()),
            }
        }
        _ => DbError::Sqlx(err),
    }
}

/// Fetch a user by Discord id, serving repeat reads from the cache.
pub async fn find_user_by_discord_id(
    db: &Database,
    discord_id: i64,
) -> Result<Option<UserRecord>> {
    let cache_key = user_discord_key(db.cache(), discord_id);
    db.cache()
        .get_or_load_present_json(&cache_key, USER_CACHE_TTL, || async {
            let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE discord_id = $1");
            let row: Option<UserRow> = sqlx::query_as(&sql)
                .bind(discord_id)
                .fetch_optional(db.pool())
                .await?;

            row.map(UserRecord::try_from).transpose()
        })
        .await
}

pub async fn find_user_by_id(db: &Database, id: i64) -> Result<Option<UserRecord>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    let row: Option<UserRow> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(db.pool())
        .await?;

    row.map(UserRecord::try_from).transpose()
}

pub async fn find_user_by_username(db: &Database, username: &str) -> Result<Option<UserRecord>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
    let row: Option<UserRow> = sqlx::query_as(&sql)
        .bind(username)
        .fetch_optional(db.pool())
        .await?;

    row.map(UserRecord::try_from).transpose()
}

/// Insert a user with every column spelled out; table defaults are not relied on.
pub async fn insert_user(db: &Database, user: &NewUser) -> Result<UserRecord> {
    let now = now_unix_secs();
    let sql = format!(
        "INSERT INTO users (
            username, password_hash, game_id, game_name, game_mode, discord_id,
            wear_training, repair_training, l_training, h_training, fuel_training, co2_training,
            fuel_price, co2_price, accumulated_count, load, income_loss_tol, fourx, role, verified,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $21)
        RETURNING {USER_COLUMNS}"
    );

    let row: UserRow = sqlx::query_as(&sql)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.game_id)
        .bind(&user.game_name)
        .bind(&user.game_mode)
        .bind(user.discord_id)
        .bind(user.wear_training)
        .bind(user.repair_training)
        .bind(user.l_training)
        .bind(user.h_training)
        .bind(user.fuel_training)
        .bind(user.co2_training)
        .bind(user.fuel_price)
        .bind(user.co2_price)
        .bind(user.accumulated_count)
        .bind(user.load)
        .bind(user.income_loss_tol)
        .bind(user.fourx)
        .bind(user.role.as_str())
        .bind(user.verified)
        .bind(now)
        .fetch_one(db.pool())
        .await
        .map_err(|e| classify_write_error(e, user.discord_id))?;

    UserRecord::try_from(row)
}

macro_rules! push_changed {
    ($builder:ident, $changes:ident, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = &$changes.$field {
                $builder.push(concat!(", ", stringify!($field), " = "));
                $builder.push_bind(value.clone());
            }
        )+
    };
}

/// Apply a partial update and return the stored row.
pub async fn update_user(db: &Database, id: i64, changes: &UserChanges) -> Result<UserRecord> {
    let previous_discord_id: Option<i64> = if changes.discord_id.is_some() {
        sqlx::query_scalar("SELECT discord_id FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(db.pool())
            .await?
    } else {
        None
    };

    let mut builder = QueryBuilder::<Postgres>::new("UPDATE users SET updated_at = ");
    builder.push_bind(now_unix_secs());
    push_changed!(
        builder,
        changes,
        email,
        game_id,
        game_name,
        game_mode,
        discord_id,
        wear_training,
        repair_training,
        l_training,
        h_training,
        fuel_training,
        co2_training,
        fuel_price,
        co2_price,
        accumulated_count,
        load,
        income_loss_tol,
        fourx,
        verified,
    );
    if let Some(role) = changes.role {
        builder.push(", role = ");
        builder.push_bind(role.as_str());
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(format!(" RETURNING {USER_COLUMNS}"));

    let row: Option<UserRow> = builder
        .build_query_as()
        .fetch_optional(db.pool())
        .await
        .map_err(|e| classify_write_error(e, changes.discord_id.unwrap_or_default()))?;

    let user = row
        .map(UserRecord::try_from)
        .transpose()?
        .ok_or_else(|| DbError::NotFound(format!("user {id}")))?;

    let mut stale = vec![user.discord_id];
    stale.extend(previous_discord_id.filter(|previous| *previous != user.discord_id));
    invalidate_users(db.cache(), &stale).await;

    Ok(user)
}
