use crate::model::{
    event::{
        event::{CreateEvent, EventListOptions},
        Event,
    },
    id::{EventId, UserId},
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait EventRepository: Send + Sync {
    // イベントを登録する
    async fn create(&self, event: CreateEvent) -> AppResult<EventId>;
    // 開催前のイベント一覧を取得する（キーワード検索つき）
    async fn find_all(&self, options: EventListOptions) -> AppResult<Vec<Event>>;
    async fn find_by_id(&self, event_id: EventId) -> AppResult<Option<Event>>;
    // 指定のイベント ID のうち、開催前のものを開催日時順に取得する
    async fn find_upcoming_by_ids(&self, event_ids: &[EventId]) -> AppResult<Vec<Event>>;
    // ユーザーが作成したイベント一覧を取得する
    async fn find_by_creator(&self, user_id: UserId) -> AppResult<Vec<Event>>;
}
