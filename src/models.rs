use std::fmt;
use std::io::Write;
use std::str::FromStr;

use super::schema::{fallback_rsvps, guests};
use chrono::NaiveDateTime;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::mysql::{Mysql, MysqlValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};

/// An invitee from the pre-seeded guest list.
#[derive(Debug, Clone, PartialEq, Eq, Insertable, Selectable, Queryable, Serialize, Deserialize)]
#[diesel(table_name = guests)]
#[diesel(check_for_backend(diesel::mysql::Mysql))]
pub struct Guest {
    pub id: String,
    pub name: String,
    pub rsvp_submitted: bool,
    pub adults_attending: u32,
    pub attending_wedding: bool,
    pub attending_reception: bool,
    pub using_hotel_block: bool,
    pub message: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Guest {
    /// A guest that has not responded yet.
    pub fn new(id: String, name: String, now: NaiveDateTime) -> Self {
        Self {
            id,
            name,
            rsvp_submitted: false,
            adults_attending: 0,
            attending_wedding: false,
            attending_reception: false,
            using_hotel_block: false,
            message: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites the RSVP fields in place.
    pub fn apply(&mut self, rsvp: &GuestRsvp) {
        self.adults_attending = rsvp.adults_attending;
        self.attending_wedding = rsvp.attending_wedding;
        self.attending_reception = rsvp.attending_reception;
        self.using_hotel_block = rsvp.using_hotel_block;
        self.message = rsvp.message.clone();
    }
}

/// The five fields a guest (or an admin on their behalf) can change.
#[derive(Debug, Clone, Default, PartialEq, Eq, AsChangeset, Serialize)]
#[diesel(table_name = guests)]
pub struct GuestRsvp {
    pub adults_attending: u32,
    pub attending_wedding: bool,
    pub attending_reception: bool,
    pub using_hotel_block: bool,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsExpression, FromSqlRow, Serialize, Deserialize)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum Attending {
    Yes,
    No,
    Maybe,
}

impl Attending {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attending::Yes => "yes",
            Attending::No => "no",
            Attending::Maybe => "maybe",
        }
    }
}

impl fmt::Display for Attending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown attendance answer: {0:?}")]
pub struct UnknownAttending(String);

impl FromStr for Attending {
    type Err = UnknownAttending;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Attending::Yes),
            "no" => Ok(Attending::No),
            "maybe" => Ok(Attending::Maybe),
            other => Err(UnknownAttending(other.to_string())),
        }
    }
}

impl ToSql<Text, Mysql> for Attending {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Mysql>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Mysql> for Attending {
    fn from_sql(bytes: MysqlValue<'_>) -> deserialize::Result<Self> {
        let raw = <String as FromSql<Text, Mysql>>::from_sql(bytes)?;
        Ok(raw.parse()?)
    }
}

/// RSVP from someone who could not find themselves on the guest list.
#[derive(Debug, Clone, PartialEq, Eq, Insertable, Selectable, Queryable, Serialize, Deserialize)]
#[diesel(table_name = fallback_rsvps)]
#[diesel(check_for_backend(diesel::mysql::Mysql))]
pub struct FallbackRsvp {
    pub id: String,
    pub name: String,
    pub email: String,
    pub attending: Attending,
    pub guests: u32,
    pub message: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A validated fallback submission, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFallbackRsvp {
    pub name: String,
    pub email: String,
    pub attending: Attending,
    pub guests: u32,
    pub message: String,
}

impl NewFallbackRsvp {
    pub fn into_record(self, id: String, now: NaiveDateTime) -> FallbackRsvp {
        FallbackRsvp {
            id,
            name: self.name,
            email: self.email,
            attending: self.attending,
            guests: self.guests,
            message: self.message,
            created_at: now,
            updated_at: now,
        }
    }
}
