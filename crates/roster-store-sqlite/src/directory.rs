//! Companies and profiles.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _};
use roster_core::{
  Entity,
  person::{Authority, Company, NewProfile, Profile, Registration, validate_name},
};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    COMPANY_COLUMNS, PROFILE_COLUMNS, RawCompany, RawProfile, encode_authority, encode_dt,
    encode_uuid, is_unique_violation,
  },
};

// ─── Companies ───────────────────────────────────────────────────────────────

pub fn create_company(conn: &Connection, name: String, now: DateTime<Utc>) -> Result<Company> {
  validate_name("name", &name)?;
  let company = Company { company_id: Uuid::new_v4(), name, created_at: now };

  conn
    .execute(
      "INSERT INTO companies (company_id, name, created_at) VALUES (?1, ?2, ?3)",
      rusqlite::params![
        encode_uuid(company.company_id),
        company.name,
        encode_dt(company.created_at),
      ],
    )
    .map_err(|e| {
      if is_unique_violation(&e) {
        roster_core::Error::Duplicate(format!("company {:?} already exists", company.name)).into()
      } else {
        crate::Error::from(e)
      }
    })?;

  Ok(company)
}

pub fn company_exists(conn: &Connection, id: Uuid) -> Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM companies WHERE company_id = ?1",
        rusqlite::params![encode_uuid(id)],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

pub fn list_companies(conn: &Connection) -> Result<Vec<Company>> {
  let mut stmt = conn.prepare(&format!("SELECT {COMPANY_COLUMNS} FROM companies ORDER BY name"))?;
  let raws = stmt
    .query_map([], RawCompany::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawCompany::into_company).collect()
}

// ─── Profiles ────────────────────────────────────────────────────────────────

fn profile_where(conn: &Connection, clause: &str, key: String) -> Result<Option<Profile>> {
  conn
    .query_row(
      &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE {clause} = ?1"),
      rusqlite::params![key],
      RawProfile::from_row,
    )
    .optional()?
    .map(RawProfile::into_profile)
    .transpose()
}

pub fn profile_by_id(conn: &Connection, id: Uuid) -> Result<Option<Profile>> {
  profile_where(conn, "profile_id", encode_uuid(id))
}

pub fn profile_by_name(conn: &Connection, username: &str) -> Result<Option<Profile>> {
  profile_where(conn, "username", username.to_owned())
}

pub fn profile_by_token(conn: &Connection, token: &str) -> Result<Option<Profile>> {
  profile_where(conn, "api_token", token.to_owned())
}

/// Like [`profile_by_id`] but a missing profile is an error.
pub fn require_profile(conn: &Connection, id: Uuid) -> Result<Profile> {
  profile_by_id(conn, id)?.ok_or_else(|| roster_core::Error::not_found(Entity::Profile, id).into())
}

pub fn list_profiles(conn: &Connection) -> Result<Vec<Profile>> {
  let mut stmt =
    conn.prepare(&format!("SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY username"))?;
  let raws = stmt
    .query_map([], RawProfile::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawProfile::into_profile).collect()
}

pub fn insert_profile(
  conn: &Connection,
  input: NewProfile,
  authority: Authority,
  is_administrator: bool,
  now: DateTime<Utc>,
) -> Result<Registration> {
  input.validate()?;
  if let Some(company_id) = input.company_id
    && !company_exists(conn, company_id)?
  {
    return Err(roster_core::Error::not_found(Entity::Company, company_id).into());
  }

  let profile = Profile {
    profile_id: Uuid::new_v4(),
    username: input.username,
    company_id: input.company_id,
    authority,
    is_administrator,
    created_at: now,
  };
  let token = Uuid::new_v4().simple().to_string();

  conn
    .execute(
      "INSERT INTO profiles (
         profile_id, username, company_id, authority, is_administrator, api_token, created_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
      rusqlite::params![
        encode_uuid(profile.profile_id),
        profile.username,
        profile.company_id.map(encode_uuid),
        encode_authority(profile.authority),
        profile.is_administrator,
        token,
        encode_dt(profile.created_at),
      ],
    )
    .map_err(|e| {
      if is_unique_violation(&e) {
        roster_core::Error::Duplicate(format!("username {:?} is taken", profile.username)).into()
      } else {
        crate::Error::from(e)
      }
    })?;

  Ok(Registration { profile, token })
}

pub fn set_company(conn: &Connection, profile_id: Uuid, company_id: Uuid) -> Result<Profile> {
  let mut profile = require_profile(conn, profile_id)?;
  if !company_exists(conn, company_id)? {
    return Err(roster_core::Error::not_found(Entity::Company, company_id).into());
  }
  conn.execute(
    "UPDATE profiles SET company_id = ?2 WHERE profile_id = ?1",
    rusqlite::params![encode_uuid(profile_id), encode_uuid(company_id)],
  )?;
  profile.company_id = Some(company_id);
  Ok(profile)
}

pub fn set_authority(conn: &Connection, profile_id: Uuid, authority: Authority) -> Result<Profile> {
  if authority == Authority::Boss {
    return Err(
      roster_core::Error::validation("authority", "there can be only one top manager").into(),
    );
  }
  let mut profile = require_profile(conn, profile_id)?;
  conn.execute(
    "UPDATE profiles SET authority = ?2 WHERE profile_id = ?1",
    rusqlite::params![encode_uuid(profile_id), encode_authority(authority)],
  )?;
  profile.authority = authority;
  Ok(profile)
}
