use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kernel::model::{
    auth::{event::CreateToken, AccessToken},
    event::{
        event::{CreateEvent, EventListOptions},
        Event,
    },
    id::{EventId, UserId},
    rsvp::{RsvpDeletion, RsvpInsertion},
    user::{event::CreateUser, EventCreator, User},
};
use kernel::repository::{
    auth::AuthRepository, event::EventRepository, health::HealthCheckRepository,
    rsvp::RsvpRepository, user::UserRepository,
};
use shared::error::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// インメモリ版のデータベース。全テーブルをひとつの Mutex の内側に
/// 持つため、try_insert の重複チェック・定員チェック・挿入は自然に
/// ひとつのアトミックな操作になる。テストで競合状態を決定的に再現
/// するために使う。
#[derive(Clone, Default)]
pub struct InMemoryDb {
    inner: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    // email -> (user_id, password)
    credentials: HashMap<String, (UserId, String)>,
    events: HashMap<EventId, Event>,
    rsvps: Vec<RsvpRecord>,
    tokens: HashMap<String, UserId>,
}

struct RsvpRecord {
    event_id: EventId,
    user_id: UserId,
    created_at: DateTime<Utc>,
}

impl InMemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: User, password: &str) {
        let mut tables = self.inner.lock().unwrap();
        tables
            .credentials
            .insert(user.email.clone(), (user.user_id, password.to_string()));
        tables.users.insert(user.user_id, user);
    }

    pub fn insert_event(&self, event: Event) {
        self.inner
            .lock()
            .unwrap()
            .events
            .insert(event.event_id, event);
    }

    pub fn insert_access_token(&self, token: &str, user_id: UserId) {
        self.inner
            .lock()
            .unwrap()
            .tokens
            .insert(token.to_string(), user_id);
    }
}

#[async_trait]
impl EventRepository for InMemoryDb {
    async fn create(&self, event: CreateEvent) -> AppResult<EventId> {
        let mut tables = self.inner.lock().unwrap();
        let creator = tables
            .users
            .get(&event.created_by)
            .ok_or_else(|| AppError::EntityNotFound("user not found".into()))?;
        let new_event = Event {
            event_id: EventId::new(),
            title: event.title,
            description: event.description,
            location: event.location,
            capacity: event.capacity,
            starts_at: event.starts_at,
            rsvp_open_at: event.rsvp_open_at,
            created_at: Utc::now(),
            creator: EventCreator {
                user_id: creator.user_id,
                user_name: creator.user_name.clone(),
                email: creator.email.clone(),
            },
        };
        let event_id = new_event.event_id;
        tables.events.insert(event_id, new_event);
        Ok(event_id)
    }

    async fn find_all(&self, options: EventListOptions) -> AppResult<Vec<Event>> {
        let tables = self.inner.lock().unwrap();
        let now = Utc::now();
        let search = options.search.map(|s| s.to_lowercase());
        let mut events: Vec<Event> = tables
            .events
            .values()
            .filter(|e| e.starts_at >= now)
            .filter(|e| match &search {
                None => true,
                Some(s) => {
                    e.title.to_lowercase().contains(s)
                        || e.description.to_lowercase().contains(s)
                        || e.location.to_lowercase().contains(s)
                }
            })
            .cloned()
            .collect();
        events.sort_by_key(|e| e.starts_at);
        Ok(events)
    }

    async fn find_by_id(&self, event_id: EventId) -> AppResult<Option<Event>> {
        Ok(self.inner.lock().unwrap().events.get(&event_id).cloned())
    }

    async fn find_upcoming_by_ids(&self, event_ids: &[EventId]) -> AppResult<Vec<Event>> {
        let tables = self.inner.lock().unwrap();
        let now = Utc::now();
        let mut events: Vec<Event> = event_ids
            .iter()
            .filter_map(|id| tables.events.get(id))
            .filter(|e| e.starts_at >= now)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.starts_at);
        Ok(events)
    }

    async fn find_by_creator(&self, user_id: UserId) -> AppResult<Vec<Event>> {
        let tables = self.inner.lock().unwrap();
        let mut events: Vec<Event> = tables
            .events
            .values()
            .filter(|e| e.creator.user_id == user_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.starts_at);
        Ok(events)
    }
}

#[async_trait]
impl RsvpRepository for InMemoryDb {
    async fn try_insert(&self, event_id: EventId, user_id: UserId) -> AppResult<RsvpInsertion> {
        let mut tables = self.inner.lock().unwrap();
        let Some(event) = tables.events.get(&event_id) else {
            return Err(AppError::EntityNotFound(format!(
                "event ({event_id}) not found"
            )));
        };
        let capacity = event.capacity as i64;

        // 登録済みかどうかは満員かどうかより先に判定する
        if tables
            .rsvps
            .iter()
            .any(|r| r.event_id == event_id && r.user_id == user_id)
        {
            return Ok(RsvpInsertion::AlreadyExists);
        }

        let count = tables
            .rsvps
            .iter()
            .filter(|r| r.event_id == event_id)
            .count() as i64;
        if count >= capacity {
            return Ok(RsvpInsertion::CapacityExhausted);
        }

        tables.rsvps.push(RsvpRecord {
            event_id,
            user_id,
            created_at: Utc::now(),
        });
        Ok(RsvpInsertion::Inserted)
    }

    async fn delete(&self, event_id: EventId, user_id: UserId) -> AppResult<RsvpDeletion> {
        let mut tables = self.inner.lock().unwrap();
        let before = tables.rsvps.len();
        tables
            .rsvps
            .retain(|r| !(r.event_id == event_id && r.user_id == user_id));
        if tables.rsvps.len() < before {
            Ok(RsvpDeletion::Deleted)
        } else {
            Ok(RsvpDeletion::NotFound)
        }
    }

    async fn count_by_event_id(&self, event_id: EventId) -> AppResult<i64> {
        let tables = self.inner.lock().unwrap();
        Ok(tables
            .rsvps
            .iter()
            .filter(|r| r.event_id == event_id)
            .count() as i64)
    }

    async fn find_user_ids_by_event_id(&self, event_id: EventId) -> AppResult<Vec<UserId>> {
        let tables = self.inner.lock().unwrap();
        let mut records: Vec<&RsvpRecord> = tables
            .rsvps
            .iter()
            .filter(|r| r.event_id == event_id)
            .collect();
        records.sort_by_key(|r| r.created_at);
        Ok(records.into_iter().map(|r| r.user_id).collect())
    }

    async fn find_event_ids_by_user_id(&self, user_id: UserId) -> AppResult<Vec<EventId>> {
        let tables = self.inner.lock().unwrap();
        let mut records: Vec<&RsvpRecord> = tables
            .rsvps
            .iter()
            .filter(|r| r.user_id == user_id)
            .collect();
        records.sort_by_key(|r| r.created_at);
        Ok(records.into_iter().map(|r| r.event_id).collect())
    }
}

#[async_trait]
impl UserRepository for InMemoryDb {
    async fn create(&self, event: CreateUser) -> AppResult<User> {
        let mut tables = self.inner.lock().unwrap();
        if tables.credentials.contains_key(&event.email) {
            return Err(AppError::UnprocessableEntity(
                "email is already registered".into(),
            ));
        }
        let user = User {
            user_id: UserId::new(),
            user_name: event.user_name,
            email: event.email,
        };
        tables
            .credentials
            .insert(user.email.clone(), (user.user_id, event.password));
        tables.users.insert(user.user_id, user.clone());
        Ok(user)
    }

    async fn find_current_user(&self, current_user_id: UserId) -> AppResult<Option<User>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .users
            .get(&current_user_id)
            .cloned())
    }

    async fn find_by_ids(&self, user_ids: &[UserId]) -> AppResult<Vec<User>> {
        let tables = self.inner.lock().unwrap();
        Ok(user_ids
            .iter()
            .filter_map(|id| tables.users.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl AuthRepository for InMemoryDb {
    async fn fetch_user_id_from_token(
        &self,
        access_token: &AccessToken,
    ) -> AppResult<Option<UserId>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .tokens
            .get(&access_token.0)
            .copied())
    }

    async fn verify_user(&self, email: &str, password: &str) -> AppResult<UserId> {
        let tables = self.inner.lock().unwrap();
        match tables.credentials.get(email) {
            Some((user_id, stored)) if stored == password => Ok(*user_id),
            _ => Err(AppError::UnauthenticatedError),
        }
    }

    async fn create_token(&self, event: CreateToken) -> AppResult<AccessToken> {
        let token = Uuid::new_v4().simple().to_string();
        self.inner
            .lock()
            .unwrap()
            .tokens
            .insert(token.clone(), event.user_id);
        Ok(AccessToken(token))
    }

    async fn delete_token(&self, access_token: &AccessToken) -> AppResult<()> {
        self.inner.lock().unwrap().tokens.remove(&access_token.0);
        Ok(())
    }
}

#[async_trait]
impl HealthCheckRepository for InMemoryDb {
    async fn check_db(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user(name: &str) -> User {
        User {
            user_id: UserId::new(),
            user_name: name.into(),
            email: format!("{name}@example.com"),
        }
    }

    fn event(capacity: i32, creator: &User) -> Event {
        let now = Utc::now();
        Event {
            event_id: EventId::new(),
            title: "Hack Night".into(),
            description: "weekly hack night".into(),
            location: "Osaka".into(),
            capacity,
            starts_at: now + Duration::days(7),
            rsvp_open_at: Some(now - Duration::hours(1)),
            created_at: now - Duration::hours(2),
            creator: EventCreator {
                user_id: creator.user_id,
                user_name: creator.user_name.clone(),
                email: creator.email.clone(),
            },
        }
    }

    #[tokio::test]
    async fn try_insert_reports_each_outcome() {
        let db = InMemoryDb::new();
        let creator = user("owner");
        let ev = event(1, &creator);
        db.insert_user(creator, "pw");
        db.insert_event(ev.clone());
        let alice = UserId::new();
        let bob = UserId::new();

        assert_eq!(
            db.try_insert(ev.event_id, alice).await.unwrap(),
            RsvpInsertion::Inserted
        );
        assert_eq!(
            db.try_insert(ev.event_id, alice).await.unwrap(),
            RsvpInsertion::AlreadyExists
        );
        assert_eq!(
            db.try_insert(ev.event_id, bob).await.unwrap(),
            RsvpInsertion::CapacityExhausted
        );
        assert_eq!(db.count_by_event_id(ev.event_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn try_insert_against_unknown_event_is_an_error() {
        let db = InMemoryDb::new();
        let res = db.try_insert(EventId::new(), UserId::new()).await;
        assert!(matches!(res, Err(AppError::EntityNotFound(_))));
    }

    #[tokio::test]
    async fn delete_frees_the_seat_and_is_idempotent() {
        let db = InMemoryDb::new();
        let creator = user("owner");
        let ev = event(1, &creator);
        db.insert_user(creator, "pw");
        db.insert_event(ev.clone());
        let alice = UserId::new();

        db.try_insert(ev.event_id, alice).await.unwrap();
        assert_eq!(
            db.delete(ev.event_id, alice).await.unwrap(),
            RsvpDeletion::Deleted
        );
        assert_eq!(
            db.delete(ev.event_id, alice).await.unwrap(),
            RsvpDeletion::NotFound
        );
        assert_eq!(db.count_by_event_id(ev.event_id).await.unwrap(), 0);

        // 取り消し後は同じユーザーがもう一度登録できる
        assert_eq!(
            db.try_insert(ev.event_id, alice).await.unwrap(),
            RsvpInsertion::Inserted
        );
    }

    #[tokio::test]
    async fn listings_follow_insertion_order() {
        let db = InMemoryDb::new();
        let creator = user("owner");
        let ev = event(10, &creator);
        db.insert_user(creator, "pw");
        db.insert_event(ev.clone());
        let users: Vec<UserId> = (0..3).map(|_| UserId::new()).collect();

        for u in &users {
            db.try_insert(ev.event_id, *u).await.unwrap();
        }

        assert_eq!(
            db.find_user_ids_by_event_id(ev.event_id).await.unwrap(),
            users
        );
        assert_eq!(
            db.find_event_ids_by_user_id(users[0]).await.unwrap(),
            vec![ev.event_id]
        );
    }
}
