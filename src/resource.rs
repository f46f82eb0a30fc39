//! The generic entity envelope and the verbs shared by every resource.
//!
//! A [`Resource`] is an untyped attribute map plus the rate limit snapshot
//! seen when it was fetched. Which endpoints a resource kind offers is data:
//! a [`ResourceDescriptor`] per kind, read by the single implementation of
//! each verb in [`Resources`].

use crate::{
    metadata::{QueryParams, RequestMetadata},
    rate_limit::RateLimitState,
    Client, Error, Result,
};
use http::Method;
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;

/// How a resource kind lists its entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEndpoint {
    /// `GET <path>`, unwrapping `items`, then `data`.
    Generic,
    /// `GET <path>`, unwrapping `items` only.
    ItemsOnly,
    /// No list endpoint; listing fails locally with this message.
    Unsupported(&'static str),
}

/// How a resource kind fetches a single entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrieveEndpoint {
    /// `GET <path>/<id>`.
    Generic,
    /// No retrieve endpoint; fetching fails locally with this message.
    Unsupported(&'static str),
}

/// Static description of one resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Singular name, also a wrapper key in single-entity responses.
    pub name: &'static str,
    /// Collection path, also a wrapper key in search responses.
    pub path: &'static str,
    /// The list strategy.
    pub list: ListEndpoint,
    /// The retrieve strategy.
    pub retrieve: RetrieveEndpoint,
    /// Whether entities carry an `id` attribute.
    pub has_id: bool,
}

impl ResourceDescriptor {
    /// Describes a kind that supports every generic verb.
    pub const fn new(name: &'static str, path: &'static str) -> Self {
        Self {
            name,
            path,
            list: ListEndpoint::Generic,
            retrieve: RetrieveEndpoint::Generic,
            has_id: true,
        }
    }

    /// Replaces the list strategy.
    pub const fn with_list(mut self, list: ListEndpoint) -> Self {
        self.list = list;
        self
    }

    /// Replaces the retrieve strategy.
    pub const fn with_retrieve(mut self, retrieve: RetrieveEndpoint) -> Self {
        self.retrieve = retrieve;
        self
    }

    /// Marks entities of this kind as never having an id.
    pub const fn without_id(mut self) -> Self {
        self.has_id = false;
        self
    }

    fn member_path(&self, id: &str) -> String {
        format!("{}/{}", self.path, id)
    }

    fn search_path(&self) -> String {
        format!("{}/search", self.path)
    }
}

/// A resource type with its own descriptor and typed readers.
pub trait ResourceType: From<Resource> + AsRef<Resource> + AsMut<Resource> {
    /// The endpoints this kind offers.
    const DESCRIPTOR: &'static ResourceDescriptor;
}

/// One API entity.
///
/// `attributes` is the only state; typed readers on the variant types read
/// from it. Instance verbs talk to the API through the client the entity
/// was created with.
///
/// # Examples
///
/// ```no_run
/// use fathom::{Client, Config};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), fathom::Error> {
/// let client = Client::new(Config::new("api-key"))?;
///
/// let mut webhook = client.webhooks().get("42").await?;
/// webhook.update(json!({"include_summary": true})).await?;
/// assert!(webhook.include_summary());
///
/// webhook.delete().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Resource {
    client: Client,
    descriptor: &'static ResourceDescriptor,
    attributes: Map<String, Value>,
    rate_limit: Option<RateLimitState>,
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("kind", &self.descriptor.name)
            .field("id", &self.id())
            .field("attributes", &self.attributes)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

impl Resource {
    /// Wraps an attribute map.
    pub fn new(
        client: Client,
        descriptor: &'static ResourceDescriptor,
        attributes: Map<String, Value>,
        rate_limit: Option<RateLimitState>,
    ) -> Self {
        Self {
            client,
            descriptor,
            attributes,
            rate_limit,
        }
    }

    /// Returns the client this entity talks to.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Returns the descriptor of this entity's kind.
    pub fn descriptor(&self) -> &'static ResourceDescriptor {
        self.descriptor
    }

    /// Returns the `id` attribute as a string, if the kind has ids and the
    /// attribute is a string or number.
    pub fn id(&self) -> Option<String> {
        if !self.descriptor.has_id {
            return None;
        }
        self.get_string("id")
    }

    /// Returns all attributes.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Consumes the entity and returns its attributes.
    pub fn into_attributes(self) -> Map<String, Value> {
        self.attributes
    }

    /// Returns the attributes as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(self.attributes.clone())
    }

    /// Returns the rate limit snapshot from the response that last touched
    /// this entity.
    pub fn rate_limit(&self) -> Option<&RateLimitState> {
        self.rate_limit.as_ref()
    }

    /// Returns an attribute.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Returns a string attribute.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_str()
    }

    /// Returns a string or numeric attribute rendered as a string.
    pub fn get_string(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Returns `true` only if the attribute is the boolean `true`.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.get(name), Some(Value::Bool(true)))
    }

    /// Returns an array attribute, or an empty slice.
    pub fn get_array(&self, name: &str) -> &[Value] {
        match self.get(name) {
            Some(Value::Array(items)) => items,
            _ => &[],
        }
    }

    /// Inserts or overwrites an attribute, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attributes.insert(name.into(), value.into())
    }

    /// Returns `true` if the attribute exists.
    pub fn has(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Reads an attribute that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAttribute`] if the key is absent.
    pub fn attribute(&self, name: &str) -> Result<&Value> {
        self.get(name)
            .ok_or_else(|| Error::UnknownAttribute(name.to_string()))
    }

    /// Reports whether [`access`](Self::access) would succeed for `name`.
    ///
    /// Write-style names (ending in `=`) always succeed; read-style names
    /// succeed when the attribute exists. `id` is never readable on kinds
    /// without an id, even when the payload carries one.
    pub fn responds_to(&self, name: &str) -> bool {
        if name == "id" && !self.descriptor.has_id {
            return false;
        }
        name.ends_with('=') || self.has(name)
    }

    /// Dynamic attribute access by name.
    ///
    /// `"title="` assigns `value` (or `null`) to `title` and returns `None`;
    /// `"title"` returns the current value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAttribute`] for a read of a missing key.
    ///
    /// # Examples
    ///
    /// ```
    /// use fathom::{Client, Config};
    /// use serde_json::{json, Map};
    ///
    /// let client = Client::new(Config::new("key")).unwrap();
    /// let mut meeting = client.meetings().build(Map::new());
    ///
    /// assert!(!meeting.responds_to("title"));
    /// assert!(meeting.access("title", None).is_err());
    ///
    /// meeting.access("title=", Some(json!("Standup"))).unwrap();
    /// assert!(meeting.responds_to("title"));
    /// assert_eq!(meeting.access("title", None).unwrap(), Some(json!("Standup")));
    /// ```
    pub fn access(&mut self, name: &str, value: Option<Value>) -> Result<Option<Value>> {
        match name.strip_suffix('=') {
            Some(key) => {
                self.set(key, value.unwrap_or(Value::Null));
                Ok(None)
            }
            None if name == "id" && !self.descriptor.has_id => {
                Err(Error::UnknownAttribute(name.to_string()))
            }
            None => self.attribute(name).map(|v| Some(v.clone())),
        }
    }

    /// Sends `PATCH <path>/<id>` and merges the returned fields into this
    /// entity. Fields the server did not return are kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] without sending anything if the entity
    /// has no id, otherwise any pipeline error.
    pub async fn update(&mut self, attributes: Value) -> Result<&mut Self> {
        let path = self.require_member_path("update")?;
        let response = self
            .client
            .call(RequestMetadata::new(Method::PATCH, path).with_body(attributes))
            .await?;
        let rate_limit = response.rate_limit();

        if let Value::Object(fields) = unwrap_single(response.data, self.descriptor.name) {
            self.attributes.extend(fields);
        }
        self.rate_limit = Some(rate_limit);
        Ok(self)
    }

    /// Sends `DELETE <path>/<id>`. Local attributes are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] without sending anything if the entity
    /// has no id, otherwise any pipeline error.
    pub async fn delete(&mut self) -> Result<bool> {
        let path = self.require_member_path("delete")?;
        let response = self.client.delete(path).await?;
        self.rate_limit = Some(response.rate_limit());
        Ok(true)
    }

    /// Sends `GET <path>/<id>` and replaces all attributes with the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] without sending anything if the entity
    /// has no id, otherwise any pipeline error.
    pub async fn reload(&mut self) -> Result<&mut Self> {
        let path = self.require_member_path("reload")?;
        let response = self.client.get(path, &QueryParams::new()).await?;
        let rate_limit = response.rate_limit();

        self.attributes = into_attributes(unwrap_single(response.data, self.descriptor.name));
        self.rate_limit = Some(rate_limit);
        Ok(self)
    }

    fn require_member_path(&self, verb: &str) -> Result<String> {
        match self.id() {
            Some(id) => Ok(self.descriptor.member_path(&id)),
            None => Err(Error::Unsupported(format!(
                "cannot {} a {} without an id",
                verb, self.descriptor.name
            ))),
        }
    }
}

/// Entry point for the class-level verbs of one resource kind.
///
/// Obtain one from the client, e.g. [`Client::meetings`].
pub struct Resources<T> {
    client: Client,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Clone for Resources<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _kind: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Resources<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resources").finish_non_exhaustive()
    }
}

impl<T: ResourceType> Resources<T> {
    /// Creates the verb set for `T`.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }

    /// Returns the client the verbs use.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Returns the descriptor of `T`.
    pub fn descriptor(&self) -> &'static ResourceDescriptor {
        T::DESCRIPTOR
    }

    /// Wraps attributes without talking to the API.
    pub fn build(&self, attributes: Map<String, Value>) -> T {
        self.wrap(attributes, None)
    }

    /// Lists entities with `GET <path>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] without sending anything for kinds
    /// with no list endpoint, otherwise any pipeline error.
    pub async fn list(&self, params: &QueryParams) -> Result<Vec<T>> {
        let keys: &[&str] = match T::DESCRIPTOR.list {
            ListEndpoint::Generic => &["items", "data"],
            ListEndpoint::ItemsOnly => &["items"],
            ListEndpoint::Unsupported(message) => {
                return Err(Error::Unsupported(message.to_string()))
            }
        };

        let response = self.client.get(T::DESCRIPTOR.path, params).await?;
        let rate_limit = response.rate_limit();
        Ok(self.wrap_all(unwrap_collection(response.data, keys), rate_limit))
    }

    /// Fetches one entity with `GET <path>/<id>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] without sending anything for kinds
    /// with no retrieve endpoint, otherwise any pipeline error.
    pub async fn get(&self, id: impl fmt::Display) -> Result<T> {
        if let RetrieveEndpoint::Unsupported(message) = T::DESCRIPTOR.retrieve {
            return Err(Error::Unsupported(message.to_string()));
        }

        let path = T::DESCRIPTOR.member_path(&id.to_string());
        let response = self.client.get(path, &QueryParams::new()).await?;
        let rate_limit = response.rate_limit();
        let data = unwrap_single(response.data, T::DESCRIPTOR.name);
        Ok(self.wrap(into_attributes(data), Some(rate_limit)))
    }

    /// Creates an entity with `POST <path>`.
    pub async fn create(&self, attributes: Value) -> Result<T> {
        let response = self.client.post(T::DESCRIPTOR.path, attributes).await?;
        let rate_limit = response.rate_limit();
        let data = unwrap_single(response.data, T::DESCRIPTOR.name);
        Ok(self.wrap(into_attributes(data), Some(rate_limit)))
    }

    /// Searches with `GET <path>/search?q=<query>`, unwrapping `data`, then
    /// the collection path key.
    pub async fn search(&self, query: &str, params: &QueryParams) -> Result<Vec<T>> {
        let mut params = params.clone();
        params.insert("q".to_string(), query.to_string());

        let response = self
            .client
            .get(T::DESCRIPTOR.search_path(), &params)
            .await?;
        let rate_limit = response.rate_limit();
        let items = unwrap_collection(response.data, &["data", T::DESCRIPTOR.path]);
        Ok(self.wrap_all(items, rate_limit))
    }

    fn wrap(&self, attributes: Map<String, Value>, rate_limit: Option<RateLimitState>) -> T {
        T::from(Resource::new(
            self.client.clone(),
            T::DESCRIPTOR,
            attributes,
            rate_limit,
        ))
    }

    fn wrap_all(&self, items: Vec<Value>, rate_limit: RateLimitState) -> Vec<T> {
        items
            .into_iter()
            .map(|item| self.wrap(into_attributes(item), Some(rate_limit)))
            .collect()
    }
}

/// Extracts a single entity: `data`, then the singular name, then the body.
pub(crate) fn unwrap_single(body: Value, name: &str) -> Value {
    unwrap_key(body, &["data", name])
}

/// Returns the first non-null value among `keys`, or the body itself.
pub(crate) fn unwrap_key(body: Value, keys: &[&str]) -> Value {
    match body {
        Value::Object(mut object) => {
            let found = keys
                .iter()
                .find(|key| object.get(**key).is_some_and(|v| !v.is_null()));
            match found {
                Some(key) => object.remove(*key).unwrap_or(Value::Null),
                None => Value::Object(object),
            }
        }
        other => other,
    }
}

/// Extracts a collection from the first non-null `keys` entry.
///
/// A bare array body is used as is. A non-array wrapper value counts as a
/// single element; no match gives an empty collection.
pub(crate) fn unwrap_collection(body: Value, keys: &[&str]) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut object) => {
            let found = keys
                .iter()
                .find_map(|key| object.remove(*key).filter(|v| !v.is_null()));
            match found {
                Some(Value::Array(items)) => items,
                Some(other) => vec![other],
                None => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}

fn into_attributes(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            tracing::debug!(value = %other, "Ignoring non-object entity payload");
            Map::new()
        }
    }
}
