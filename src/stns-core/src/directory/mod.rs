//! Identity lookups against the directory's `/users` and `/groups` resources.
use crate::error::directory::DirectoryError;
use crate::error::directory::DirectoryError::{DecodeFailed, NotFound, RequestFailed};
use crate::http::transport::Transport;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

pub const USERS_ENDPOINT: &str = "/users";
pub const GROUPS_ENDPOINT: &str = "/groups";

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub group_id: i64,
    #[serde(default)]
    pub directory: String,
    #[serde(default)]
    pub shell: String,
    #[serde(default)]
    pub gecos: String,
    /// Public keys in authorized-keys format, in the directory's order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub keys: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub setup_commands: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Group {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

enum Filter<'a> {
    All,
    Name(&'a str),
    Id(i64),
}

impl Filter<'_> {
    fn to_query(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        match self {
            Filter::All => {}
            Filter::Name(name) => {
                query.append_pair("name", name);
            }
            Filter::Id(id) => {
                query.append_pair("id", &id.to_string());
            }
        }
        query.finish()
    }
}

/// Fetches identity records. Every call issues a fresh request.
pub struct DirectoryClient {
    transport: Transport,
}

impl DirectoryClient {
    pub fn new(transport: Transport) -> Self {
        DirectoryClient { transport }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn list_users(&self) -> Result<Vec<User>, DirectoryError> {
        self.fetch(USERS_ENDPOINT, &Filter::All)
    }

    pub fn get_user_by_name(&self, name: &str) -> Result<User, DirectoryError> {
        self.fetch_one(USERS_ENDPOINT, &Filter::Name(name))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<User, DirectoryError> {
        self.fetch_one(USERS_ENDPOINT, &Filter::Id(id))
    }

    pub fn list_groups(&self) -> Result<Vec<Group>, DirectoryError> {
        self.fetch(GROUPS_ENDPOINT, &Filter::All)
    }

    pub fn get_group_by_name(&self, name: &str) -> Result<Group, DirectoryError> {
        self.fetch_one(GROUPS_ENDPOINT, &Filter::Name(name))
    }

    pub fn get_group_by_id(&self, id: i64) -> Result<Group, DirectoryError> {
        self.fetch_one(GROUPS_ENDPOINT, &Filter::Id(id))
    }

    fn fetch<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        filter: &Filter<'_>,
    ) -> Result<Vec<T>, DirectoryError> {
        let response = self
            .transport
            .request(resource, &filter.to_query())
            .map_err(|err| RequestFailed(resource, err))?;
        serde_json::from_slice(&response.body).map_err(|err| DecodeFailed(resource, err))
    }

    fn fetch_one<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        filter: &Filter<'_>,
    ) -> Result<T, DirectoryError> {
        self.fetch(resource, filter)?
            .into_iter()
            .next()
            .ok_or_else(|| NotFound {
                resource,
                query: filter.to_query(),
            })
    }
}
