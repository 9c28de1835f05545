//! Permission decisions for list requests.
//!
//! Every request is resolved exactly once into an [`Access`] value; handlers
//! branch on that value instead of re-deriving permissions. Resolution fails
//! closed: anything that does not positively grant access yields
//! [`Access::Denied`].

use cinelist_catalog::MovieList;
use cinelist_db::{Connection, queries};

use crate::error::StoreError;

/// Username/password pair presented with a request.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// How a credentialed caller names the list they want to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSelector<'a> {
    Id(i64),
    /// Resolved among the caller's own lists; the oldest wins on duplicates.
    Name(&'a str),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AccessRequest<'a> {
    pub identifier: Option<&'a str>,
    pub credentials: Option<Credentials<'a>>,
    pub list: Option<ListSelector<'a>>,
}

impl<'a> AccessRequest<'a> {
    pub fn by_identifier(identifier: &'a str) -> Self {
        Self {
            identifier: Some(identifier),
            ..Default::default()
        }
    }

    pub fn with_credentials(mut self, username: &'a str, password: &'a str) -> Self {
        self.credentials = Some(Credentials { username, password });
        self
    }

    pub fn selecting(mut self, list: ListSelector<'a>) -> Self {
        self.list = Some(list);
        self
    }
}

/// Outcome of resolving a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Access {
    Denied,
    ReadOnly(MovieList),
    Owner(MovieList),
}

impl Access {
    pub fn list(&self) -> Option<&MovieList> {
        match self {
            Access::Denied => None,
            Access::ReadOnly(list) | Access::Owner(list) => Some(list),
        }
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, Access::Owner(_))
    }

    /// The list, if this access permits mutation.
    pub fn require_owner(self) -> Result<MovieList, StoreError> {
        match self {
            Access::Owner(list) => Ok(list),
            _ => Err(StoreError::Denied),
        }
    }
}

/// Who is making a request that is not scoped to an existing list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    User(i64),
}

impl Caller {
    pub fn require_user(self) -> Result<i64, StoreError> {
        match self {
            Caller::User(id) => Ok(id),
            Caller::Anonymous => Err(StoreError::Denied),
        }
    }
}

/// Checks a username/password pair against stored users.
///
/// Password hashing lives outside this crate; implementations return the
/// matching user's ID or `None` when the pair does not verify.
pub trait CredentialVerifier {
    fn verify(
        &self,
        conn: &Connection,
        username: &str,
        password: &str,
    ) -> Result<Option<i64>, StoreError>;
}

/// Verifier for token-only deployments: no credential ever verifies.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCredentials;

impl CredentialVerifier for NoCredentials {
    fn verify(&self, _: &Connection, _: &str, _: &str) -> Result<Option<i64>, StoreError> {
        Ok(None)
    }
}

pub struct AccessResolver<'c, V = NoCredentials> {
    conn: &'c Connection,
    verifier: V,
}

impl<'c> AccessResolver<'c, NoCredentials> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            verifier: NoCredentials,
        }
    }
}

impl<'c, V: CredentialVerifier> AccessResolver<'c, V> {
    pub fn with_verifier(conn: &'c Connection, verifier: V) -> Self {
        Self { conn, verifier }
    }

    /// Resolve a request into an access decision.
    ///
    /// Verified credentials of the list's owner grant `Owner` whatever token
    /// accompanies them. Otherwise the identifier decides: public before
    /// private.
    pub fn resolve(&self, request: &AccessRequest<'_>) -> Result<Access, StoreError> {
        let by_token = match request.identifier {
            Some(identifier) => resolve_identifier(self.conn, identifier)?,
            None => Access::Denied,
        };

        if let Some(creds) = request.credentials {
            if let Some(user_id) =
                self.verifier
                    .verify(self.conn, creds.username, creds.password)?
            {
                let target = match request.list {
                    Some(ListSelector::Id(id)) => queries::find_list_by_id(self.conn, id)?,
                    Some(ListSelector::Name(name)) => {
                        queries::find_list_by_owner_and_name(self.conn, user_id, name)?
                    }
                    None => by_token.list().cloned(),
                };
                if let Some(list) = target.filter(|l| l.user_id == user_id) {
                    return Ok(Access::Owner(list));
                }
            } else {
                log::debug!("Credentials for '{}' did not verify", creds.username);
            }
        }

        Ok(by_token)
    }
}

/// Token-only resolution: the public space is searched before the private one.
pub fn resolve_identifier(conn: &Connection, identifier: &str) -> Result<Access, StoreError> {
    if let Some(list) = queries::find_list_by_public_id(conn, identifier)? {
        return Ok(Access::ReadOnly(list));
    }
    if let Some(list) = queries::find_list_by_private_id(conn, identifier)? {
        return Ok(Access::Owner(list));
    }
    Ok(Access::Denied)
}
