use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::notification::{NewNotification, Notification};
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::NotificationRepository;
use crate::models::engagement::{NewNotificationRow, NotificationRow};
use crate::schema::notifications;

use super::support::parse_stored;

pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_notification(row: NotificationRow) -> Result<Notification, DomainError> {
    Ok(Notification {
        notification_type: parse_stored(&row.notification_type)?,
        id: row.id,
        recipient_id: row.recipient_id,
        sender_id: row.sender_id,
        title: row.title,
        message: row.message,
        link: row.link,
        is_read: row.is_read,
        created_at: row.created_at,
    })
}

/// Inserts on the caller's connection so it can join a wider transaction.
pub(crate) fn insert_notification(
    conn: &mut PgConnection,
    notification: &NewNotification,
) -> Result<Notification, DomainError> {
    let row = diesel::insert_into(notifications::table)
        .values(&NewNotificationRow {
            id: Uuid::new_v4(),
            recipient_id: notification.recipient_id,
            sender_id: notification.sender_id,
            title: notification.title.clone(),
            notification_type: notification.kind.as_str().to_string(),
            message: notification.message.clone(),
            link: notification.link.clone(),
        })
        .returning(NotificationRow::as_returning())
        .get_result(conn)?;
    to_notification(row)
}

impl NotificationRepository for DieselNotificationRepository {
    fn create(&self, notification: NewNotification) -> Result<Notification, DomainError> {
        let mut conn = self.pool.get()?;
        insert_notification(&mut conn, &notification)
    }

    fn list(&self, recipient_id: Uuid, page: PageRequest) -> Result<Page<Notification>, DomainError> {
        let mut conn = self.pool.get()?;
        let total: i64 = notifications::table
            .filter(notifications::recipient_id.eq(recipient_id))
            .count()
            .get_result(&mut conn)?;
        let rows = notifications::table
            .filter(notifications::recipient_id.eq(recipient_id))
            .select(NotificationRow::as_select())
            .order((notifications::created_at.desc(), notifications::id.asc()))
            .limit(page.page_size)
            .offset(page.offset())
            .load(&mut conn)?;
        let results = rows
            .into_iter()
            .map(to_notification)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(results, total, page))
    }

    fn mark_all_read(&self, recipient_id: Uuid) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(
            notifications::table
                .filter(notifications::recipient_id.eq(recipient_id))
                .filter(notifications::is_read.eq(false)),
        )
        .set(notifications::is_read.eq(true))
        .execute(&mut conn)?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::DieselNotificationRepository;
    use crate::domain::notification::{NewNotification, NotificationKind};
    use crate::domain::page::PageRequest;
    use crate::domain::ports::NotificationRepository;
    use crate::domain::role::Role;
    use crate::infrastructure::testing::{seed_user, setup_db};

    #[tokio::test]
    async fn mark_all_read_only_touches_recipient() {
        let (_container, pool) = setup_db().await;
        let repo = DieselNotificationRepository::new(pool.clone());
        let me = seed_user(&pool, Role::Athlete, "Me");
        let other = seed_user(&pool, Role::Athlete, "Other");

        for recipient in [me, me, other] {
            repo.create(NewNotification {
                recipient_id: recipient,
                sender_id: None,
                title: "Hello".into(),
                kind: NotificationKind::Like,
                message: None,
                link: None,
            })
            .unwrap();
        }

        assert_eq!(repo.mark_all_read(me).unwrap(), 2);
        assert_eq!(repo.mark_all_read(me).unwrap(), 0);

        let mine = repo.list(me, PageRequest::default()).unwrap();
        assert_eq!(mine.count, 2);
        assert!(mine.results.iter().all(|n| n.is_read));
        let theirs = repo.list(other, PageRequest::default()).unwrap();
        assert!(!theirs.results[0].is_read);
    }
}
