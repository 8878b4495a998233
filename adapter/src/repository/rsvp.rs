use crate::database::ConnectionPool;
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::{EventId, RsvpId, UserId},
    rsvp::{RsvpDeletion, RsvpInsertion},
};
use kernel::repository::rsvp::RsvpRepository;
use shared::error::{AppError, AppResult};
use uuid::Uuid;

#[derive(new)]
pub struct RsvpRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl RsvpRepository for RsvpRepositoryImpl {
    // 参加登録を行う。
    //
    // イベント行を FOR UPDATE でロックしたトランザクション内で
    // 重複チェックと定員ガード付き INSERT を実行する。同じイベントへの
    // 同時リクエストはこの行ロックで直列化されるため、COUNT の評価と
    // INSERT の間に他のリクエストが割り込むことはない。
    // ロックなしで COUNT → INSERT と分けて実行してはならない。
    async fn try_insert(&self, event_id: EventId, user_id: UserId) -> AppResult<RsvpInsertion> {
        let mut tx = self.db.begin().await?;

        let capacity: Option<i32> =
            sqlx::query_scalar("SELECT capacity FROM events WHERE event_id = $1 FOR UPDATE")
                .bind(event_id.raw())
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::SpecificOperationError)?;

        let Some(capacity) = capacity else {
            return Err(AppError::EntityNotFound(format!(
                "event ({event_id}) not found"
            )));
        };

        // 登録済みかどうかは満員かどうかより先に判定する
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM rsvps WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(event_id.raw())
        .bind(user_id.raw())
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if exists {
            return Ok(RsvpInsertion::AlreadyExists);
        }

        let res = sqlx::query(
            r#"
                INSERT INTO rsvps (rsvp_id, event_id, user_id)
                SELECT $1, $2, $3
                WHERE (SELECT COUNT(*) FROM rsvps WHERE event_id = $2) < $4
            "#,
        )
        .bind(RsvpId::new().raw())
        .bind(event_id.raw())
        .bind(user_id.raw())
        .bind(capacity as i64)
        .execute(&mut *tx)
        .await;

        // コミットしない経路では tx のドロップでロールバックされる
        match res {
            Ok(done) => {
                if done.rows_affected() < 1 {
                    return Ok(RsvpInsertion::CapacityExhausted);
                }
                tx.commit().await.map_err(AppError::TransactionError)?;
                Ok(RsvpInsertion::Inserted)
            }
            // (event_id, user_id) の一意制約。ロック取得前にすれ違った
            // 同一ユーザーの同時リクエストをここで拾う
            Err(e)
                if e.as_database_error()
                    .is_some_and(|de| de.is_unique_violation()) =>
            {
                Ok(RsvpInsertion::AlreadyExists)
            }
            Err(e) => Err(AppError::SpecificOperationError(e)),
        }
    }

    async fn delete(&self, event_id: EventId, user_id: UserId) -> AppResult<RsvpDeletion> {
        let res = sqlx::query("DELETE FROM rsvps WHERE event_id = $1 AND user_id = $2")
            .bind(event_id.raw())
            .bind(user_id.raw())
            .execute(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            Ok(RsvpDeletion::NotFound)
        } else {
            Ok(RsvpDeletion::Deleted)
        }
    }

    async fn count_by_event_id(&self, event_id: EventId) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM rsvps WHERE event_id = $1")
            .bind(event_id.raw())
            .fetch_one(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)
    }

    async fn find_user_ids_by_event_id(&self, event_id: EventId) -> AppResult<Vec<UserId>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM rsvps WHERE event_id = $1 ORDER BY created_at ASC",
        )
        .bind(event_id.raw())
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(ids.into_iter().map(UserId::from).collect())
    }

    async fn find_event_ids_by_user_id(&self, user_id: UserId) -> AppResult<Vec<EventId>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT event_id FROM rsvps WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(user_id.raw())
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(ids.into_iter().map(EventId::from).collect())
    }
}
