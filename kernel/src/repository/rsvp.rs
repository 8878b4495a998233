use crate::model::{
    id::{EventId, UserId},
    rsvp::{RsvpDeletion, RsvpInsertion},
};
use async_trait::async_trait;
use shared::error::AppResult;

/// RSVP 行の永続化を担うリポジトリ。
///
/// try_insert は一意制約と定員ガードをストア上の単一のアトミックな
/// 操作として評価しなければならない。カウントの読み取りと INSERT を
/// ロックなしで別々に実行する実装はこの契約を満たさない。
#[async_trait]
pub trait RsvpRepository: Send + Sync {
    async fn try_insert(&self, event_id: EventId, user_id: UserId) -> AppResult<RsvpInsertion>;
    async fn delete(&self, event_id: EventId, user_id: UserId) -> AppResult<RsvpDeletion>;
    // 表示専用。参加可否の判定には使わないこと
    async fn count_by_event_id(&self, event_id: EventId) -> AppResult<i64>;
    async fn find_user_ids_by_event_id(&self, event_id: EventId) -> AppResult<Vec<UserId>>;
    async fn find_event_ids_by_user_id(&self, user_id: UserId) -> AppResult<Vec<EventId>>;
}
