use crate::model::{
    id::UserId,
    user::{event::CreateUser, User},
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, event: CreateUser) -> AppResult<User>;
    async fn find_current_user(&self, current_user_id: UserId) -> AppResult<Option<User>>;
    // 参加者一覧の表示用にユーザー情報をまとめて取得する
    async fn find_by_ids(&self, user_ids: &[UserId]) -> AppResult<Vec<User>>;
}
