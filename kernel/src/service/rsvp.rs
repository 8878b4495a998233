use crate::model::{
    event::{Event, EventWithAttendees},
    id::{EventId, UserId},
    rsvp::{RsvpDeletion, RsvpInsertion},
    user::Attendee,
};
use crate::repository::{event::EventRepository, rsvp::RsvpRepository, user::UserRepository};
use chrono::{DateTime, Duration, Utc};
use shared::error::{AppError, AppResult};
use std::sync::Arc;

/// RSVP の受付可否を判定し、ストアへの書き込みを実行するサービス。
///
/// リクエストをまたいで状態を持たない。判定はすべてその都度ストアから
/// 読み直し、定員と重複の最終判定はストア側のアトミックな条件付き
/// INSERT に委ねる。複数のプロセスが同じイベントに対して同時に
/// 呼び出しても、確定済みの参加者数が定員を超えることはない。
#[derive(Clone)]
pub struct RsvpService {
    events: Arc<dyn EventRepository>,
    rsvps: Arc<dyn RsvpRepository>,
    users: Arc<dyn UserRepository>,
    open_delay: Duration,
}

impl RsvpService {
    pub fn new(
        events: Arc<dyn EventRepository>,
        rsvps: Arc<dyn RsvpRepository>,
        users: Arc<dyn UserRepository>,
        open_delay_secs: i64,
    ) -> Self {
        Self {
            events,
            rsvps,
            users,
            open_delay: Duration::seconds(open_delay_secs),
        }
    }

    /// イベントへの参加登録を試みる。
    ///
    /// 判定は以下の順に行う。順序はクライアントへ返す理由の精度に
    /// 影響するため入れ替えてはならない。
    /// ① イベントの存在確認
    /// ② 開催済みでないこと
    /// ③ 受付開始時刻を過ぎていること
    /// ④ ストアへの条件付き INSERT（重複・定員はここで確定する）
    pub async fn try_reserve(
        &self,
        event_id: EventId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<EventWithAttendees> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| AppError::EntityNotFound(format!("event ({event_id}) not found")))?;

        if now >= event.starts_at {
            return Err(AppError::EventAlreadyStarted);
        }

        let rsvp_open_at = self.rsvp_open_at(&event);
        if now < rsvp_open_at {
            // 残り秒数は切り上げで返す
            let wait_millis = (rsvp_open_at - now).num_milliseconds();
            let wait_secs = (wait_millis + 999) / 1000;
            return Err(AppError::RsvpNotYetOpen { wait_secs });
        }

        match self.rsvps.try_insert(event_id, user_id).await? {
            RsvpInsertion::Inserted => self.snapshot(event_id).await,
            RsvpInsertion::AlreadyExists => Err(AppError::AlreadyRsvped),
            RsvpInsertion::CapacityExhausted => Err(AppError::EventFull),
        }
    }

    /// 参加登録を取り消す。登録が無ければ NotRsvped を返すだけで、
    /// 何度呼んでも状態は変わらない。
    pub async fn cancel(&self, event_id: EventId, user_id: UserId) -> AppResult<EventWithAttendees> {
        match self.rsvps.delete(event_id, user_id).await? {
            RsvpDeletion::Deleted => self.snapshot(event_id).await,
            RsvpDeletion::NotFound => Err(AppError::NotRsvped),
        }
    }

    /// 表示用のスナップショットを取得する。参加可否の判定には使わない。
    pub async fn snapshot(&self, event_id: EventId) -> AppResult<EventWithAttendees> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| AppError::EntityNotFound(format!("event ({event_id}) not found")))?;

        let attendee_count = self.rsvps.count_by_event_id(event_id).await?;
        let user_ids = self.rsvps.find_user_ids_by_event_id(event_id).await?;
        let attendees = self
            .users
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(Attendee::from)
            .collect();

        Ok(EventWithAttendees {
            event,
            attendees,
            attendee_count,
        })
    }

    pub fn rsvp_open_at(&self, event: &Event) -> DateTime<Utc> {
        event
            .rsvp_open_at
            .unwrap_or(event.created_at + self.open_delay)
    }
}
