use chrono::Utc;
use diesel::dsl::{exists, select};
use diesel::prelude::*;
use diesel_async::pooled_connection::deadpool::{Object, Pool};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncMysqlConnection, RunQueryDsl};

use super::{RecordStore, StoreError, StoreResult};
use crate::models::{FallbackRsvp, Guest, GuestRsvp};

diesel::sql_function!(fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text);

/// Guests and fallback RSVPs in MySQL, through a diesel-async pool.
#[derive(Clone)]
pub struct MysqlStore {
    pool: Pool<AsyncMysqlConnection>,
}

impl MysqlStore {
    pub fn new(pool: Pool<AsyncMysqlConnection>) -> Self {
        MysqlStore { pool }
    }

    /// Builds a standalone pool, for tools running outside Rocket.
    pub fn connect(database_url: &str) -> StoreResult<Self> {
        let manager = AsyncDieselConnectionManager::<AsyncMysqlConnection>::new(database_url);
        let pool = Pool::builder(manager)
            .build()
            .map_err(|e| StoreError::Pool(e.to_string()))?;
        Ok(MysqlStore { pool })
    }

    async fn conn(&self) -> StoreResult<Object<AsyncMysqlConnection>> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))
    }
}

/// Escapes LIKE wildcards so the needle matches literally.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[rocket::async_trait]
impl RecordStore for MysqlStore {
    async fn search_guests(&self, needle: &str, limit: usize) -> StoreResult<Vec<Guest>> {
        use crate::schema::guests::dsl::*;

        let mut conn = self.conn().await?;
        let found = guests
            .filter(lower(name).like(like_pattern(needle)))
            .order(name)
            .limit(limit as i64)
            .select(Guest::as_select())
            .load(&mut *conn)
            .await?;
        Ok(found)
    }

    async fn find_guest(&self, guest_id: &str) -> StoreResult<Option<Guest>> {
        use crate::schema::guests::dsl::*;

        let mut conn = self.conn().await?;
        let guest = guests
            .find(guest_id)
            .select(Guest::as_select())
            .first(&mut *conn)
            .await
            .optional()?;
        Ok(guest)
    }

    async fn insert_guest(&self, guest: &Guest) -> StoreResult<()> {
        use crate::schema::guests::dsl::*;

        let mut conn = self.conn().await?;
        diesel::insert_into(guests)
            .values(guest)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    async fn update_guest(
        &self,
        guest_id: &str,
        rsvp: &GuestRsvp,
        submitted: bool,
    ) -> StoreResult<Option<Guest>> {
        use crate::schema::guests::dsl::*;

        let mut conn = self.conn().await?;
        let touched = Utc::now().naive_utc();
        if submitted {
            diesel::update(guests.find(guest_id))
                .set((rsvp, rsvp_submitted.eq(true), updated_at.eq(touched)))
                .execute(&mut *conn)
                .await?;
        } else {
            diesel::update(guests.find(guest_id))
                .set((rsvp, updated_at.eq(touched)))
                .execute(&mut *conn)
                .await?;
        }

        // MySQL has no RETURNING; read the row back like the edit forms do.
        let guest = guests
            .find(guest_id)
            .select(Guest::as_select())
            .first(&mut *conn)
            .await
            .optional()?;
        Ok(guest)
    }

    async fn delete_guest(&self, guest_id: &str) -> StoreResult<bool> {
        use crate::schema::guests::dsl::*;

        let mut conn = self.conn().await?;
        let removed = diesel::delete(guests.find(guest_id))
            .execute(&mut *conn)
            .await?;
        Ok(removed > 0)
    }

    async fn delete_all_guests(&self) -> StoreResult<usize> {
        use crate::schema::guests::dsl::*;

        let mut conn = self.conn().await?;
        Ok(diesel::delete(guests).execute(&mut *conn).await?)
    }

    async fn submitted_guests(&self) -> StoreResult<Vec<Guest>> {
        use crate::schema::guests::dsl::*;

        let mut conn = self.conn().await?;
        let submitted = guests
            .filter(rsvp_submitted.eq(true))
            .order(name)
            .select(Guest::as_select())
            .load(&mut *conn)
            .await?;
        Ok(submitted)
    }

    async fn fallback_exists(&self, by_email: &str, by_name: &str) -> StoreResult<bool> {
        use crate::schema::fallback_rsvps::dsl::*;

        let mut conn = self.conn().await?;
        let taken = select(exists(
            fallback_rsvps.filter(
                email
                    .eq(by_email)
                    .or(lower(name).eq(by_name.to_lowercase())),
            ),
        ))
        .get_result(&mut *conn)
        .await?;
        Ok(taken)
    }

    async fn insert_fallback(&self, rsvp: &FallbackRsvp) -> StoreResult<()> {
        use crate::schema::fallback_rsvps::dsl::*;

        let mut conn = self.conn().await?;
        diesel::insert_into(fallback_rsvps)
            .values(rsvp)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    async fn fallback_rsvps(&self) -> StoreResult<Vec<FallbackRsvp>> {
        use crate::schema::fallback_rsvps::dsl::*;

        let mut conn = self.conn().await?;
        let all = fallback_rsvps
            .order(name)
            .select(FallbackRsvp::as_select())
            .load(&mut *conn)
            .await?;
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("An"), "%an%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
