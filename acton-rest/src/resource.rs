//! Resource descriptors
//!
//! A [`Resource`] bundles the functions that know how to find, list, and
//! change one entity type. The crate never stores entities itself; it only
//! calls these functions in a fixed order for each request.
//!
//! Two types are involved:
//!
//! - `T` is the internal entity as the collaborator stores it.
//! - `D` is the transport shape (DTO) used for JSON bodies, both inbound
//!   (create, update, search filters) and outbound.
//!
//! They may be the same type, but keeping them apart lets the stored shape
//! and the public shape evolve independently.
//!
//! # Example
//!
//! ```rust
//! use acton_rest::resource::{Action, Resource, SubEntity};
//! use acton_rest::handlers::Page;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone)]
//! struct Item { id: String, name: String, tags: Vec<String> }
//!
//! #[derive(Serialize, Deserialize)]
//! struct ItemDto { id: String, name: String }
//!
//! let resource = Resource::<Item, ItemDto>::builder("items")
//!     .find(|_key| None)
//!     .find_all(Vec::new)
//!     .find_all_paged(|page| Page::empty(page, 20))
//!     .to_dto(|item| ItemDto { id: item.id.clone(), name: item.name.clone() })
//!     .sub_entity(SubEntity::new("tags", |item: &Item| item.tags.clone()))
//!     .authorize(|ctx, action, _items| {
//!         action == Action::GetAll || ctx.header("x-role") == Some("admin")
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(resource.path(), "items");
//! ```

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::handlers::Page;

/// Lookup by opaque string key
pub type FindFn<T> = Box<dyn Fn(&str) -> Option<T> + Send + Sync>;
/// Fetch one page for a page token
pub type FindPagedFn<T> = Box<dyn Fn(i64) -> Page<T> + Send + Sync>;
/// Fetch every entity
pub type FindAllFn<T> = Box<dyn Fn() -> Vec<T> + Send + Sync>;
/// Fetch entities matching a filter expressed in the transport type
pub type SearchFn<T, D> = Box<dyn Fn(D) -> Vec<T> + Send + Sync>;
/// Apply a patch to an existing entity
pub type MutateFn<T, D> = Box<dyn Fn(T, D) -> anyhow::Result<T> + Send + Sync>;
/// Create a new entity from a transport value
pub type CreateFn<T, D> = Box<dyn Fn(D) -> anyhow::Result<T> + Send + Sync>;
/// Remove an entity
pub type DeleteFn<T> = Box<dyn Fn(T) -> anyhow::Result<T> + Send + Sync>;
/// Convert an entity to its transport shape
pub type DtoFn<T, D> = Box<dyn Fn(&T) -> D + Send + Sync>;
/// Decide whether an action on zero or more entities is permitted
pub type AuthorizeFn<T> = Box<dyn Fn(&RequestContext, Action, &[T]) -> bool + Send + Sync>;

type SubEntityFn<T> = Box<dyn Fn(&T) -> serde_json::Result<Value> + Send + Sync>;

/// Action tag passed to the authorization predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Listing, paging, or searching the collection
    GetAll,
    /// Reading a single entity or one of its sub-collections
    GetOne,
    /// Updating an existing entity
    Mutate,
    /// Creating a new entity
    Create,
    /// Deleting an entity
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GetAll => write!(f, "get_all"),
            Self::GetOne => write!(f, "get_one"),
            Self::Mutate => write!(f, "mutate"),
            Self::Create => write!(f, "create"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// A named read-only collection reachable from a parent entity
///
/// Exposed as `GET /<path>/{id}/<sub_path>`. Elements are serialized as they
/// are produced; no DTO conversion is applied.
pub struct SubEntity<T> {
    sub_path: String,
    get: SubEntityFn<T>,
}

impl<T> SubEntity<T> {
    /// Create a sub-entity from a getter producing any serializable elements
    pub fn new<F, S>(sub_path: impl Into<String>, get: F) -> Self
    where
        F: Fn(&T) -> Vec<S> + Send + Sync + 'static,
        S: Serialize,
    {
        Self {
            sub_path: sub_path.into().trim_matches('/').to_string(),
            get: Box::new(move |item| serde_json::to_value(get(item))),
        }
    }

    /// Path segment under the parent item
    pub fn sub_path(&self) -> &str {
        &self.sub_path
    }

    /// Produce the collection for a parent as a JSON array
    pub(crate) fn collect(&self, item: &T) -> serde_json::Result<Value> {
        (self.get)(item)
    }
}

impl<T> fmt::Debug for SubEntity<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubEntity")
            .field("sub_path", &self.sub_path)
            .finish_non_exhaustive()
    }
}

/// Immutable descriptor for one REST resource
///
/// Created through [`Resource::builder`]. Which optional functions are set
/// decides, once and for all, which routes exist; see
/// [`Resource::routes`](crate::routes).
pub struct Resource<T, D> {
    path: String,
    find: FindFn<T>,
    find_all_paged: FindPagedFn<T>,
    find_all: FindAllFn<T>,
    pub(crate) search: Option<SearchFn<T, D>>,
    pub(crate) mutate: Option<MutateFn<T, D>>,
    pub(crate) create: Option<CreateFn<T, D>>,
    pub(crate) delete: Option<DeleteFn<T>>,
    sub_entities: Vec<SubEntity<T>>,
    to_dto: DtoFn<T, D>,
    authorize: Option<AuthorizeFn<T>>,
}

impl<T, D> Resource<T, D> {
    /// Start building a resource mounted at `path`
    pub fn builder(path: impl Into<String>) -> ResourceBuilder<T, D> {
        ResourceBuilder::new(path)
    }

    /// Mount path without leading or trailing slashes
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Declared sub-entities in declaration order
    pub fn sub_entities(&self) -> &[SubEntity<T>] {
        &self.sub_entities
    }

    pub(crate) fn find(&self, key: &str) -> Option<T> {
        (self.find)(key)
    }

    pub(crate) fn find_all(&self) -> Vec<T> {
        (self.find_all)()
    }

    pub(crate) fn find_all_paged(&self, token: i64) -> Page<T> {
        (self.find_all_paged)(token)
    }

    pub(crate) fn to_dto(&self, item: &T) -> D {
        (self.to_dto)(item)
    }

    /// Evaluate the authorization predicate; an absent predicate permits everything
    pub(crate) fn authorize(&self, ctx: &RequestContext, action: Action, items: &[T]) -> bool {
        self.authorize
            .as_ref()
            .is_none_or(|authorize| authorize(ctx, action, items))
    }
}

impl<T, D> fmt::Debug for Resource<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("path", &self.path)
            .field("search", &self.search.is_some())
            .field("mutate", &self.mutate.is_some())
            .field("create", &self.create.is_some())
            .field("delete", &self.delete.is_some())
            .field("sub_entities", &self.sub_entities)
            .field("authorize", &self.authorize.is_some())
            .finish()
    }
}

/// Builder for [`Resource`]
///
/// `find`, `find_all`, `find_all_paged`, and `to_dto` are required; every
/// other function is optional and enables its route when set.
pub struct ResourceBuilder<T, D> {
    path: String,
    find: Option<FindFn<T>>,
    find_all_paged: Option<FindPagedFn<T>>,
    find_all: Option<FindAllFn<T>>,
    search: Option<SearchFn<T, D>>,
    mutate: Option<MutateFn<T, D>>,
    create: Option<CreateFn<T, D>>,
    delete: Option<DeleteFn<T>>,
    sub_entities: Vec<SubEntity<T>>,
    to_dto: Option<DtoFn<T, D>>,
    authorize: Option<AuthorizeFn<T>>,
}

impl<T, D> ResourceBuilder<T, D> {
    fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into().trim_matches('/').to_string(),
            find: None,
            find_all_paged: None,
            find_all: None,
            search: None,
            mutate: None,
            create: None,
            delete: None,
            sub_entities: Vec::new(),
            to_dto: None,
            authorize: None,
        }
    }

    /// Set the single-item lookup
    #[must_use]
    pub fn find<F>(mut self, find: F) -> Self
    where
        F: Fn(&str) -> Option<T> + Send + Sync + 'static,
    {
        self.find = Some(Box::new(find));
        self
    }

    /// Set the paged listing
    #[must_use]
    pub fn find_all_paged<F>(mut self, find_all_paged: F) -> Self
    where
        F: Fn(i64) -> Page<T> + Send + Sync + 'static,
    {
        self.find_all_paged = Some(Box::new(find_all_paged));
        self
    }

    /// Set the full listing
    #[must_use]
    pub fn find_all<F>(mut self, find_all: F) -> Self
    where
        F: Fn() -> Vec<T> + Send + Sync + 'static,
    {
        self.find_all = Some(Box::new(find_all));
        self
    }

    /// Enable `POST /filter`
    #[must_use]
    pub fn search<F>(mut self, search: F) -> Self
    where
        F: Fn(D) -> Vec<T> + Send + Sync + 'static,
    {
        self.search = Some(Box::new(search));
        self
    }

    /// Enable `PUT /{id}`
    #[must_use]
    pub fn mutate<F>(mut self, mutate: F) -> Self
    where
        F: Fn(T, D) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.mutate = Some(Box::new(mutate));
        self
    }

    /// Enable `POST /`
    #[must_use]
    pub fn create<F>(mut self, create: F) -> Self
    where
        F: Fn(D) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.create = Some(Box::new(create));
        self
    }

    /// Enable `DELETE /{id}`
    #[must_use]
    pub fn delete<F>(mut self, delete: F) -> Self
    where
        F: Fn(T) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.delete = Some(Box::new(delete));
        self
    }

    /// Add a sub-entity route
    #[must_use]
    pub fn sub_entity(mut self, sub_entity: SubEntity<T>) -> Self {
        self.sub_entities.push(sub_entity);
        self
    }

    /// Set the DTO conversion
    #[must_use]
    pub fn to_dto<F>(mut self, to_dto: F) -> Self
    where
        F: Fn(&T) -> D + Send + Sync + 'static,
    {
        self.to_dto = Some(Box::new(to_dto));
        self
    }

    /// Set the authorization predicate
    ///
    /// `items` is empty for aggregate actions and when the addressed item
    /// does not exist; otherwise it holds the addressed item.
    #[must_use]
    pub fn authorize<F>(mut self, authorize: F) -> Self
    where
        F: Fn(&RequestContext, Action, &[T]) -> bool + Send + Sync + 'static,
    {
        self.authorize = Some(Box::new(authorize));
        self
    }

    /// Validate and freeze the descriptor
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResource`] when the path is empty or contains
    /// route syntax, a required function is missing, or a sub-entity path is
    /// invalid. Duplicate sub-entity paths keep the first declaration.
    pub fn build(self) -> Result<Resource<T, D>> {
        let path = self.path;
        validate_segment(&path, "resource path")?;

        let find = self
            .find
            .ok_or_else(|| Error::invalid_resource(&path, "missing find function"))?;
        let find_all = self
            .find_all
            .ok_or_else(|| Error::invalid_resource(&path, "missing find_all function"))?;
        let find_all_paged = self
            .find_all_paged
            .ok_or_else(|| Error::invalid_resource(&path, "missing find_all_paged function"))?;
        let to_dto = self
            .to_dto
            .ok_or_else(|| Error::invalid_resource(&path, "missing to_dto function"))?;

        let mut sub_entities: Vec<SubEntity<T>> = Vec::with_capacity(self.sub_entities.len());
        for sub_entity in self.sub_entities {
            validate_segment(&sub_entity.sub_path, "sub-entity path")
                .map_err(|_| {
                    Error::invalid_resource(
                        &path,
                        format!("invalid sub-entity path '{}'", sub_entity.sub_path),
                    )
                })?;
            if sub_entities.iter().any(|s| s.sub_path == sub_entity.sub_path) {
                tracing::warn!(
                    resource = %path,
                    sub_path = %sub_entity.sub_path,
                    "Duplicate sub-entity path ignored; first declaration wins"
                );
                continue;
            }
            sub_entities.push(sub_entity);
        }

        Ok(Resource {
            path,
            find,
            find_all_paged,
            find_all,
            search: self.search,
            mutate: self.mutate,
            create: self.create,
            delete: self.delete,
            sub_entities,
            to_dto,
            authorize: self.authorize,
        })
    }
}

fn validate_segment(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::invalid_resource(value, format!("{what} must not be empty")));
    }
    if value.contains(['{', '}', '*', ':']) || value.contains("//") {
        return Err(Error::invalid_resource(
            value,
            format!("{what} must not contain route syntax"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, Method, Uri};

    #[derive(Debug, Clone, PartialEq)]
    struct Widget {
        id: String,
        parts: Vec<u32>,
    }

    fn minimal(path: &str) -> ResourceBuilder<Widget, String> {
        Resource::builder(path)
            .find(|key| {
                (key == "1").then(|| Widget {
                    id: "1".to_string(),
                    parts: vec![3, 4],
                })
            })
            .find_all(Vec::new)
            .find_all_paged(|page| Page::empty(page, 10))
            .to_dto(|w| w.id.clone())
    }

    fn ctx() -> RequestContext {
        RequestContext::new(Method::GET, Uri::from_static("/"), HeaderMap::new())
    }

    #[test]
    fn test_build_minimal() {
        let resource = minimal("/widgets/").build().unwrap();
        assert_eq!(resource.path(), "widgets");
        assert!(resource.search.is_none());
        assert!(resource.mutate.is_none());
        assert!(resource.create.is_none());
        assert!(resource.delete.is_none());
        assert_eq!(resource.find("1").map(|w| w.id), Some("1".to_string()));
        assert!(resource.find("2").is_none());
    }

    #[test]
    fn test_nested_path_allowed() {
        let resource = minimal("api/v1/widgets").build().unwrap();
        assert_eq!(resource.path(), "api/v1/widgets");
    }

    #[test]
    fn test_empty_path_rejected() {
        let err = minimal("/").build().unwrap_err();
        assert!(matches!(err, Error::InvalidResource { .. }));
    }

    #[test]
    fn test_route_syntax_in_path_rejected() {
        assert!(minimal("widgets/{id}").build().is_err());
        assert!(minimal("widgets/*rest").build().is_err());
    }

    #[test]
    fn test_missing_required_functions() {
        let err = Resource::<Widget, String>::builder("widgets")
            .find_all(Vec::new)
            .find_all_paged(|page| Page::empty(page, 10))
            .to_dto(|w| w.id.clone())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("missing find function"));

        let err = Resource::<Widget, String>::builder("widgets")
            .find(|_| None)
            .find_all(Vec::new)
            .find_all_paged(|page| Page::empty(page, 10))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("missing to_dto function"));
    }

    #[test]
    fn test_duplicate_sub_entity_keeps_first() {
        let resource = minimal("widgets")
            .sub_entity(SubEntity::new("parts", |w: &Widget| w.parts.clone()))
            .sub_entity(SubEntity::new("parts", |_: &Widget| vec!["ignored"]))
            .sub_entity(SubEntity::new("/labels/", |w: &Widget| vec![w.id.clone()]))
            .build()
            .unwrap();

        let paths: Vec<&str> = resource.sub_entities().iter().map(|s| s.sub_path()).collect();
        assert_eq!(paths, vec!["parts", "labels"]);

        let widget = resource.find("1").unwrap();
        let parts = resource.sub_entities()[0].collect(&widget).unwrap();
        assert_eq!(parts, serde_json::json!([3, 4]));
    }

    #[test]
    fn test_invalid_sub_entity_path_rejected() {
        let err = minimal("widgets")
            .sub_entity(SubEntity::new("", |w: &Widget| w.parts.clone()))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("invalid sub-entity path"));
    }

    #[test]
    fn test_absent_predicate_permits() {
        let resource = minimal("widgets").build().unwrap();
        assert!(resource.authorize(&ctx(), Action::Delete, &[]));
    }

    #[test]
    fn test_predicate_receives_items() {
        let resource = minimal("widgets")
            .authorize(|_, action, items| action == Action::GetOne && items.len() == 1)
            .build()
            .unwrap();
        let widget = resource.find("1").unwrap();
        assert!(resource.authorize(&ctx(), Action::GetOne, std::slice::from_ref(&widget)));
        assert!(!resource.authorize(&ctx(), Action::GetOne, &[]));
        assert!(!resource.authorize(&ctx(), Action::Delete, std::slice::from_ref(&widget)));
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::GetAll.to_string(), "get_all");
        assert_eq!(Action::GetOne.to_string(), "get_one");
        assert_eq!(Action::Mutate.to_string(), "mutate");
        assert_eq!(Action::Create.to_string(), "create");
        assert_eq!(Action::Delete.to_string(), "delete");
    }
}
