//! The account directory service.
//!
//! Owns the persisted user records and reset tokens plus the ephemeral
//! session slot. Every operation is a plain read-modify-write over one
//! storage entry; there is no locking, so concurrent writers to the same
//! storage race and the last write wins.

use chrono::Duration;
use url::Url;

use super::error::AuthError;
use super::password::{hash_password, verify_password};
use super::session::{route_for_role, Destination, Session};
use super::store::{find_by_email, generate_user_id, load_users, save_users, Registration, UserRecord};
use super::tokens::{load_tokens, save_tokens, ResetTicket, ResetToken, TokenTable};
use crate::modules::config::{ConfigError, DirectoryConfig};
use crate::modules::storage::{read_json, write_json, KeyValueStore};
use crate::modules::utils::logging::{log_auth_event, log_data_operation};
use crate::modules::utils::time::{Clock, SystemClock};

pub struct AccountDirectory {
    local: Box<dyn KeyValueStore>,
    session: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    config: DirectoryConfig,
    reset_page: Url,
}

impl AccountDirectory {
    /// Build a directory over a persistent store and an ephemeral session store
    pub fn new(
        local: impl KeyValueStore + 'static,
        session: impl KeyValueStore + 'static,
        config: DirectoryConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let reset_page = config.reset_page_url()?;
        Ok(Self {
            local: Box::new(local),
            session: Box::new(session),
            clock: Box::new(SystemClock),
            config,
            reset_page,
        })
    }

    /// Replace the wall clock, mainly for driving token expiry in tests
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Create a new account. Emails are unique regardless of case.
    pub fn register(&mut self, data: Registration) -> Result<UserRecord, AuthError> {
        let mut users = load_users(&*self.local, &self.config.users_key)?;
        if find_by_email(&users, &data.email).is_some() {
            log_auth_event("register", &data.email, false, Some("email already registered"));
            return Err(AuthError::DuplicateEmail);
        }

        let created_at = self.clock.now();
        let user = UserRecord {
            id: generate_user_id(created_at),
            name: data.name.unwrap_or_default(),
            email: data.email,
            phone: data.phone.unwrap_or_default(),
            role: data.role.unwrap_or_default(),
            password: hash_password(&data.password, self.config.hash_iterations)?,
            created_at,
        };
        users.push(user.clone());
        self.persist_users(&user.email, "register", &users)?;

        log_auth_event("register", &user.email, true, Some(user.role.as_str()));
        Ok(user)
    }

    /// Check credentials and open a session for the matching account
    pub fn login(&mut self, email: &str, password: &str) -> Result<UserRecord, AuthError> {
        let users = load_users(&*self.local, &self.config.users_key)?;
        let user = match find_by_email(&users, email) {
            Some(user) => user,
            None => {
                log_auth_event("login", email, false, Some("no such account"));
                return Err(AuthError::no_account());
            }
        };

        if !verify_password(password, &user.password)? {
            log_auth_event("login", email, false, Some("invalid password"));
            return Err(AuthError::InvalidCredentials);
        }

        write_json(
            &mut *self.session,
            &self.config.session_key,
            &Session::from(user),
        )?;

        log_auth_event("login", &user.email, true, Some(user.role.as_str()));
        Ok(user.clone())
    }

    /// Drop the current session, if any, and point the caller at the landing page
    pub fn logout(&mut self) -> Result<Destination, AuthError> {
        self.session.remove_item(&self.config.session_key)?;
        log::info!("Session cleared");
        Ok(Destination::Landing)
    }

    /// Issue a reset token for an existing account. Nothing is delivered; the
    /// caller gets the token and the reset link back.
    pub fn request_reset(&mut self, email: &str) -> Result<ResetTicket, AuthError> {
        let users = load_users(&*self.local, &self.config.users_key)?;
        let user = match find_by_email(&users, email) {
            Some(user) => user,
            None => {
                log_auth_event("request_reset", email, false, Some("no such account"));
                return Err(AuthError::no_account());
            }
        };

        let ttl = Duration::seconds(self.config.reset_token_ttl_secs as i64);
        let entry = ResetToken::issue(&user.email, self.clock.now(), ttl);
        let token = entry.token.clone();

        let mut tokens = load_tokens(&*self.local, &self.config.reset_tokens_key)?;
        tokens.insert(token.clone(), entry);
        self.persist_tokens(&user.email, "issue_reset_token", &tokens)?;

        log_auth_event("request_reset", &user.email, true, None);
        Ok(ResetTicket {
            reset_url: self.reset_url(&token),
            token,
        })
    }

    /// Return the email a live token is bound to. An expired token is deleted on sight.
    pub fn validate_token(&mut self, token: &str) -> Result<String, AuthError> {
        let mut tokens = load_tokens(&*self.local, &self.config.reset_tokens_key)?;
        let entry = match tokens.get(token) {
            Some(entry) => entry,
            None => return Err(AuthError::InvalidToken),
        };

        if entry.is_expired(self.clock.now()) {
            let email = entry.email.clone();
            tokens.remove(token);
            self.persist_tokens(&email, "expire_reset_token", &tokens)?;
            log_auth_event("validate_token", &email, false, Some("token expired"));
            return Err(AuthError::ExpiredToken);
        }

        Ok(entry.email.clone())
    }

    /// Set a new password through a live token, consuming the token.
    ///
    /// The token is removed before the new password is written, so a failed
    /// write leaves the old password and a spent token, never a reusable one.
    pub fn reset_password(&mut self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let email = self.validate_token(token)?;

        let mut users = load_users(&*self.local, &self.config.users_key)?;
        let user = match users.iter_mut().find(|user| user.matches_email(&email)) {
            Some(user) => user,
            None => {
                log_auth_event("reset_password", &email, false, Some("no user for token"));
                return Err(AuthError::no_user_for_token());
            }
        };
        user.password = hash_password(new_password, self.config.hash_iterations)?;

        let mut tokens = load_tokens(&*self.local, &self.config.reset_tokens_key)?;
        tokens.remove(token);
        self.persist_tokens(&email, "consume_reset_token", &tokens)?;

        self.persist_users(&email, "reset_password", &users)?;

        log_auth_event("reset_password", &email, true, Some("Password reset successful."));
        Ok(())
    }

    pub fn list_users(&self) -> Result<Vec<UserRecord>, AuthError> {
        Ok(load_users(&*self.local, &self.config.users_key)?)
    }

    /// The session opened by the last successful login, if still present.
    /// It is not checked against the directory.
    pub fn current_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(read_json(&*self.session, &self.config.session_key)?)
    }

    /// Dashboard for `user`, or for the current session when no user is given.
    /// Anything unreadable routes to the customer dashboard.
    pub fn route_after_login(&self, user: Option<&UserRecord>) -> Destination {
        let role = match user {
            Some(user) => Some(user.role),
            None => self.current_session().ok().flatten().map(|session| session.role),
        };
        route_for_role(role)
    }

    fn reset_url(&self, token: &str) -> String {
        let mut url = self.reset_page.clone();
        url.query_pairs_mut().append_pair("token", token);
        url.to_string()
    }

    fn persist_users(
        &mut self,
        actor: &str,
        operation: &str,
        users: &[UserRecord],
    ) -> Result<(), AuthError> {
        let key = self.config.users_key.clone();
        let result = save_users(&mut *self.local, &key, users);
        log_data_operation(operation, actor, &key, result.is_ok(), None);
        Ok(result?)
    }

    fn persist_tokens(
        &mut self,
        actor: &str,
        operation: &str,
        tokens: &TokenTable,
    ) -> Result<(), AuthError> {
        let key = self.config.reset_tokens_key.clone();
        let result = save_tokens(&mut *self.local, &key, tokens);
        log_data_operation(operation, actor, &key, result.is_ok(), None);
        Ok(result?)
    }
}
