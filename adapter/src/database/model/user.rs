use kernel::model::user::User;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub user_name: String,
    pub email: String,
}

impl From<UserRow> for User {
    fn from(value: UserRow) -> Self {
        let UserRow {
            user_id,
            user_name,
            email,
        } = value;
        User {
            user_id: user_id.into(),
            user_name,
            email,
        }
    }
}

/// ログイン時の検証に使う型
#[derive(sqlx::FromRow)]
pub struct UserCredentialRow {
    pub user_id: Uuid,
    pub password_hash: String,
}
