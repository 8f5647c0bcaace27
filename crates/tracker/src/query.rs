//! Query builder: pure functions from lookup arguments to specs.
//!
//! Nothing here performs I/O or logging. Lookups by name always ask for one
//! page of one row, because only the first match is ever used. Child listings
//! ask for full pages with no limit and rely on the transport to page through
//! the whole collection.

use serde_json::{Map, Value};

use crate::{
    CreateSpec, FetchFields, Filter, ObjectType, Pagination, ProjectId, QuerySpec, QueryTarget,
    ReferencePath, Scope, WorkspaceId, FIELD_EMAIL_ADDRESS, FIELD_NAME,
};

/// Specs that can carry a [`Scope`] block.
pub trait Scoped {
    fn scope_mut(&mut self) -> &mut Option<Scope>;
}

impl Scoped for QuerySpec {
    fn scope_mut(&mut self) -> &mut Option<Scope> {
        &mut self.scope
    }
}

impl Scoped for CreateSpec {
    fn scope_mut(&mut self) -> &mut Option<Scope> {
        &mut self.scope
    }
}

/// Renders workspace/project ids into a scope block.
///
/// Returns `None` when neither id is given; each present id is rendered
/// independently.
pub fn scope_for(workspace: Option<&WorkspaceId>, project: Option<&ProjectId>) -> Option<Scope> {
    if workspace.is_none() && project.is_none() {
        return None;
    }
    Some(Scope {
        workspace: workspace.map(|id| format!("/workspace/{id}")),
        project: project.map(|id| format!("/project/{id}")),
    })
}

/// Sets the scope block of `spec` if at least one id is given.
///
/// With neither id the spec is returned untouched, whatever it already holds.
pub fn apply_scope<S: Scoped>(
    mut spec: S,
    workspace: Option<&WorkspaceId>,
    project: Option<&ProjectId>,
) -> S {
    if let Some(scope) = scope_for(workspace, project) {
        *spec.scope_mut() = Some(scope);
    }
    spec
}

/// A single-row lookup of `object_type` by `Name`.
///
/// `fetch` defaults to `[Name, ObjectID]`. An empty `name` is not rejected;
/// guarding it is the caller's job.
pub fn build_lookup_query(
    object_type: &ObjectType,
    name: &str,
    workspace: Option<&WorkspaceId>,
    project: Option<&ProjectId>,
    fetch: Option<FetchFields>,
) -> QuerySpec {
    let spec = QuerySpec {
        target: QueryTarget::ByFilter {
            object_type: object_type.clone(),
            filter: Filter::equals(FIELD_NAME, name),
        },
        scope: None,
        fetch: fetch.unwrap_or_default(),
        pagination: Pagination::SINGLE_ROW,
    };
    apply_scope(spec, workspace, project)
}

/// A single-row, unscoped lookup of a user by e-mail address.
pub fn build_user_lookup_query(email: &str) -> QuerySpec {
    QuerySpec {
        target: QueryTarget::ByFilter {
            object_type: ObjectType::user(),
            filter: Filter::equals(FIELD_EMAIL_ADDRESS, email),
        },
        scope: None,
        fetch: FetchFields::default(),
        pagination: Pagination::SINGLE_ROW,
    }
}

/// A full listing of the collection at `/{parent_type}/{parent_id}/{relation}`.
pub fn build_child_listing_query(
    parent_type: &ObjectType,
    parent_id: &str,
    relation: &str,
) -> QuerySpec {
    QuerySpec {
        target: QueryTarget::ByReference(ReferencePath::child_collection(
            parent_type,
            parent_id,
            relation,
        )),
        scope: None,
        fetch: FetchFields::default(),
        pagination: Pagination::FULL_LISTING,
    }
}

/// A create of `object_type` with `attributes`, returning the default fetch
/// fields of the new object.
pub fn build_create_spec(
    object_type: &ObjectType,
    attributes: Map<String, Value>,
    workspace: Option<&WorkspaceId>,
    project: Option<&ProjectId>,
) -> CreateSpec {
    let spec = CreateSpec {
        object_type: object_type.clone(),
        attributes,
        scope: None,
        fetch: FetchFields::default(),
    };
    apply_scope(spec, workspace, project)
}

/// The minimal attributes of an object created by find-or-create.
pub fn name_attributes(name: &str) -> Map<String, Value> {
    let mut attributes = Map::new();
    attributes.insert(FIELD_NAME.to_owned(), Value::String(name.to_owned()));
    attributes
}
