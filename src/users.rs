use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::{
    request::Request,
    response_writer::ResponseWriter,
    router::Router,
    server::{Handler, HttpMethod},
    status_code_registry::ReasonPhrase,
};

pub const CONTENT_READY: &str = "Content Ready";
pub const USER_CREATED: &str = "User successfully created!";
pub const USER_UPDATED: &str = "User successfully updated!";
pub const USER_DELETED: &str = "User successfully deleted!";
pub const BAD_ID_FORMAT: &str = "Bad id format!";
pub const USER_NOT_FOUND: &str = "User not found!";
pub const CONTACT_CREATED: &str = "Contact successfully created!";
pub const CONTACT_NOT_FOUND: &str = "Contact not found!";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<Contact>,
}

/// An address book entry owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The writable part of a user, as sent by clients.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RepoError {
    #[error("user {0} not found")]
    NotFound(i64),
    #[error("contact {1} of user {0} not found")]
    ContactNotFound(i64, i64),
    #[error("user store is poisoned")]
    Poisoned,
}

pub trait UserRepo: Send + Sync {
    fn list(&self) -> Result<Vec<User>, RepoError>;
    fn create(&self, input: UserInput) -> Result<User, RepoError>;
    fn get(&self, id: i64) -> Result<User, RepoError>;
    fn update(&self, id: i64, input: UserInput) -> Result<User, RepoError>;
    fn delete(&self, id: i64) -> Result<(), RepoError>;
    fn add_contact(&self, user_id: i64, input: ContactInput) -> Result<Contact, RepoError>;
    fn get_contact(&self, user_id: i64, contact_id: i64) -> Result<Contact, RepoError>;
}

#[derive(Debug, Default)]
struct Store {
    last_id: i64,
    last_contact_id: i64,
    users: BTreeMap<i64, User>,
}

/// Keeps users in memory, ordered by id.
#[derive(Debug, Default)]
pub struct InMemoryUserRepo {
    store: RwLock<Store>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepo for InMemoryUserRepo {
    fn list(&self) -> Result<Vec<User>, RepoError> {
        let store = self.store.read().map_err(|_| RepoError::Poisoned)?;
        Ok(store.users.values().cloned().collect())
    }

    fn create(&self, input: UserInput) -> Result<User, RepoError> {
        let mut store = self.store.write().map_err(|_| RepoError::Poisoned)?;
        store.last_id += 1;
        let now = Utc::now();
        let user = User {
            id: store.last_id,
            first_name: input.first_name,
            last_name: input.last_name,
            created_at: now,
            updated_at: now,
            contacts: vec![],
        };
        store.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn get(&self, id: i64) -> Result<User, RepoError> {
        let store = self.store.read().map_err(|_| RepoError::Poisoned)?;
        store.users.get(&id).cloned().ok_or(RepoError::NotFound(id))
    }

    fn update(&self, id: i64, input: UserInput) -> Result<User, RepoError> {
        let mut store = self.store.write().map_err(|_| RepoError::Poisoned)?;
        let user = store.users.get_mut(&id).ok_or(RepoError::NotFound(id))?;
        user.first_name = input.first_name;
        user.last_name = input.last_name;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut store = self.store.write().map_err(|_| RepoError::Poisoned)?;
        store
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound(id))
    }

    fn add_contact(&self, user_id: i64, input: ContactInput) -> Result<Contact, RepoError> {
        let mut store = self.store.write().map_err(|_| RepoError::Poisoned)?;
        if !store.users.contains_key(&user_id) {
            Err(RepoError::NotFound(user_id))?
        }
        store.last_contact_id += 1;
        let now = Utc::now();
        let contact = Contact {
            id: store.last_contact_id,
            user_id,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            created_at: now,
            updated_at: now,
        };
        let user = store
            .users
            .get_mut(&user_id)
            .ok_or(RepoError::NotFound(user_id))?;
        user.contacts.push(contact.clone());
        Ok(contact)
    }

    fn get_contact(&self, user_id: i64, contact_id: i64) -> Result<Contact, RepoError> {
        let store = self.store.read().map_err(|_| RepoError::Poisoned)?;
        let user = store.users.get(&user_id).ok_or(RepoError::NotFound(user_id))?;
        user.contacts
            .iter()
            .find(|c| c.id == contact_id)
            .cloned()
            .ok_or(RepoError::ContactNotFound(user_id, contact_id))
    }
}

/// Routes for the users resource, mounted below `prefix`.
pub fn new_user_router(prefix: &str, repo: Arc<dyn UserRepo>) -> Router {
    let mut router = Router::with_prefix(prefix);
    router.add_route(HttpMethod::Get, "", list_users(Arc::clone(&repo)));
    router.add_route(HttpMethod::Post, "", create_user(Arc::clone(&repo)));
    router.add_route(HttpMethod::Get, "/{id}", get_user(Arc::clone(&repo)));
    router.add_route(HttpMethod::Put, "/{id}", update_user(Arc::clone(&repo)));
    router.add_route(HttpMethod::Delete, "/{id}", delete_user(Arc::clone(&repo)));
    router.add_route(HttpMethod::Post, "/{id}/contacts", create_contact(Arc::clone(&repo)));
    router.add_route(HttpMethod::Get, "/{id}/contacts/{contactId}", get_contact(repo));
    router
}

fn list_users(repo: Arc<dyn UserRepo>) -> impl Handler + Sync {
    move |w: &mut ResponseWriter, r: &mut Request| match repo.list() {
        Ok(users) => w.success_reply(ReasonPhrase::OK, CONTENT_READY, users, r),
        Err(err) => repo_failure(w, r, err),
    }
}

fn create_user(repo: Arc<dyn UserRepo>) -> impl Handler + Sync {
    move |w: &mut ResponseWriter, r: &mut Request| {
        let Some(input) = parse_body::<UserInput>(w, r) else {
            return;
        };
        match repo.create(input) {
            Ok(user) => w.success_reply(ReasonPhrase::Created, USER_CREATED, user, r),
            Err(err) => repo_failure(w, r, err),
        }
    }
}

fn get_user(repo: Arc<dyn UserRepo>) -> impl Handler + Sync {
    move |w: &mut ResponseWriter, r: &mut Request| {
        let Some(id) = parse_id(w, r, "id") else {
            return;
        };
        match repo.get(id) {
            Ok(user) => w.success_reply(ReasonPhrase::OK, CONTENT_READY, user, r),
            Err(err) => repo_failure(w, r, err),
        }
    }
}

fn update_user(repo: Arc<dyn UserRepo>) -> impl Handler + Sync {
    move |w: &mut ResponseWriter, r: &mut Request| {
        let Some(id) = parse_id(w, r, "id") else {
            return;
        };
        if let Err(err) = repo.get(id) {
            repo_failure(w, r, err);
            return;
        }
        let Some(input) = parse_body::<UserInput>(w, r) else {
            return;
        };
        match repo.update(id, input) {
            Ok(user) => w.success_reply(ReasonPhrase::Accepted, USER_UPDATED, user, r),
            Err(err) => repo_failure(w, r, err),
        }
    }
}

fn delete_user(repo: Arc<dyn UserRepo>) -> impl Handler + Sync {
    move |w: &mut ResponseWriter, r: &mut Request| {
        let Some(id) = parse_id(w, r, "id") else {
            return;
        };
        match repo.delete(id) {
            Ok(()) => w.success_reply(ReasonPhrase::OK, USER_DELETED, (), r),
            Err(err) => repo_failure(w, r, err),
        }
    }
}

fn create_contact(repo: Arc<dyn UserRepo>) -> impl Handler + Sync {
    move |w: &mut ResponseWriter, r: &mut Request| {
        let Some(user_id) = parse_id(w, r, "id") else {
            return;
        };
        let Some(input) = parse_body::<ContactInput>(w, r) else {
            return;
        };
        match repo.add_contact(user_id, input) {
            Ok(contact) => w.success_reply(ReasonPhrase::Created, CONTACT_CREATED, contact, r),
            Err(err) => repo_failure(w, r, err),
        }
    }
}

fn get_contact(repo: Arc<dyn UserRepo>) -> impl Handler + Sync {
    move |w: &mut ResponseWriter, r: &mut Request| {
        let Some(user_id) = parse_id(w, r, "id") else {
            return;
        };
        let Some(contact_id) = parse_id(w, r, "contactId") else {
            return;
        };
        match repo.get_contact(user_id, contact_id) {
            Ok(contact) => w.success_reply(ReasonPhrase::OK, CONTENT_READY, contact, r),
            Err(err) => repo_failure(w, r, err),
        }
    }
}

/// Path variable `name` as an id; answers 400 when it is missing or not a number.
fn parse_id(w: &mut ResponseWriter, r: &Request, name: &str) -> Option<i64> {
    let id = r.get_var(name).and_then(|id| id.parse().ok());
    if id.is_none() {
        w.failure_reply(ReasonPhrase::BadRequest.status_code(), BAD_ID_FORMAT, r);
    }
    id
}

fn parse_body<T: DeserializeOwned>(w: &mut ResponseWriter, r: &Request) -> Option<T> {
    match serde_json::from_slice(r.get_body().unwrap_or_default()) {
        Ok(input) => Some(input),
        Err(err) => {
            w.failure_reply(ReasonPhrase::BadRequest.status_code(), &err.to_string(), r);
            None
        }
    }
}

fn repo_failure(w: &mut ResponseWriter, r: &Request, err: RepoError) {
    match err {
        RepoError::NotFound(_) => {
            w.failure_reply(ReasonPhrase::NotFound.status_code(), USER_NOT_FOUND, r)
        }
        RepoError::ContactNotFound(..) => {
            w.failure_reply(ReasonPhrase::NotFound.status_code(), CONTACT_NOT_FOUND, r)
        }
        RepoError::Poisoned => {
            error!(?err);
            w.failure_reply(
                ReasonPhrase::InternalServerError.status_code(),
                &err.to_string(),
                r,
            )
        }
    }
}
