use serde_json::{Map, Value};
use tracker::{
    build_child_listing_query, build_create_spec, build_lookup_query, build_user_lookup_query,
    name_attributes, FetchFields, LogLevel, Logger, ObjectId, ObjectType, ProjectId, QueryResult,
    QuerySpec, RallyConfig, Record, ResolverError, ResultSet, TestFolderId, Transport,
    TransportError, WorkspaceId,
};

/// Collection of a test folder that holds its test cases.
pub const TEST_CASES_RELATION: &str = "TestCases";

/// The workspace, project and test folder named in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguredScope {
    pub workspace: WorkspaceId,
    pub project: ProjectId,
    pub test_folder: TestFolderId,
}

/// Resolves tracker objects by name and creates them on demand.
///
/// Generic over the transport so tests can substitute a double; production
/// code uses the `rally` crate's HTTP client.
pub struct Resolver<T> {
    config: RallyConfig,
    configured: ConfiguredScope,
    transport: T,
    logger: Logger,
}

fn display_opt<D: std::fmt::Display>(value: Option<D>) -> String {
    value.map_or_else(|| "-".to_owned(), |v| v.to_string())
}

impl<T: Transport> Resolver<T> {
    /// Validates `config` and builds a resolver over `transport`.
    ///
    /// # Errors
    ///
    /// [`ResolverError::Configuration`] naming every required key that is
    /// absent or blank.
    pub fn new(config: RallyConfig, transport: T, logger: Logger) -> Result<Self, ResolverError> {
        config.validate()?;
        let (Some(workspace), Some(project), Some(test_folder)) = (
            config.workspace_id(),
            config.project_id(),
            config.test_folder_id(),
        ) else {
            return Err(ResolverError::Configuration {
                missing: config.missing_keys(),
            });
        };
        Ok(Self {
            configured: ConfiguredScope {
                workspace,
                project,
                test_folder,
            },
            config,
            transport,
            logger,
        })
    }

    /// Workspace, project and test folder from the configuration.
    pub fn configured_scope(&self) -> &ConfiguredScope {
        &self.configured
    }

    /// The transport every operation goes through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the `ObjectID` of the first `object_type` named `name`.
    ///
    /// An empty `name` resolves to `None` without contacting the transport.
    /// Any further matches beyond the first are ignored.
    ///
    /// # Errors
    ///
    /// The transport's error, logged at error level and otherwise unchanged.
    #[tracing::instrument(level = "debug", skip_all, fields(object_type = %object_type, name = name))]
    pub async fn resolve_by_name(
        &self,
        object_type: &ObjectType,
        name: &str,
        workspace: Option<&WorkspaceId>,
        project: Option<&ProjectId>,
        fetch: Option<FetchFields>,
    ) -> Result<Option<ObjectId>, ResolverError> {
        self.logger.debug(&format!(
            "resolve_by_name {object_type}, {name}, {}, {}",
            display_opt(workspace),
            display_opt(project)
        ));
        if name.is_empty() {
            return Ok(None);
        }

        let spec = build_lookup_query(object_type, name, workspace, project, fetch);
        self.first_object_id(&spec).await
    }

    /// Returns the `ObjectID` of the user with e-mail address `email`.
    ///
    /// An empty `email` resolves to `None` without contacting the transport.
    ///
    /// # Errors
    ///
    /// The transport's error, logged at error level and otherwise unchanged.
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn resolve_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ObjectId>, ResolverError> {
        self.logger.debug(&format!("resolve_user_by_email {email}"));
        if email.is_empty() {
            return Ok(None);
        }

        let spec = build_user_lookup_query(email);
        self.first_object_id(&spec).await
    }

    /// Returns the id of the `object_type` named `name`, creating it with
    /// `{Name: name}` if the lookup finds nothing.
    ///
    /// An existing object is returned as-is; its attributes are never
    /// updated. The lookup completes before the create starts, but nothing
    /// stops a concurrent caller from creating the same name in between.
    ///
    /// Returns `None` only if the create response carried no object id.
    ///
    /// # Errors
    ///
    /// The transport error from either the lookup or the create.
    #[tracing::instrument(level = "debug", skip_all, fields(object_type = %object_type, name = name))]
    pub async fn find_or_create(
        &self,
        object_type: &ObjectType,
        name: &str,
        workspace: Option<&WorkspaceId>,
        project: Option<&ProjectId>,
        fetch: Option<FetchFields>,
    ) -> Result<Option<ObjectId>, ResolverError> {
        self.logger.debug(&format!(
            "find_or_create {object_type}, {name}, {}, {}",
            display_opt(workspace),
            display_opt(project)
        ));

        if let Some(id) = self
            .resolve_by_name(object_type, name, workspace, project, fetch)
            .await?
        {
            return Ok(Some(id));
        }

        if name.is_empty() {
            self.logger
                .warn(&format!("find_or_create {object_type} with an empty name"));
        }
        self.create_object(object_type, name_attributes(name), workspace, project)
            .await
    }

    /// Creates an `object_type` with `attributes` and returns its id.
    ///
    /// Returns `None` when the service answered without an object id, which
    /// it may do for a create it silently rejected.
    ///
    /// Attachment content payloads are never written to the log; only the
    /// type and scope are.
    ///
    /// # Errors
    ///
    /// The transport's error, logged at error level and otherwise unchanged.
    #[tracing::instrument(level = "debug", skip_all, fields(object_type = %object_type))]
    pub async fn create_object(
        &self,
        object_type: &ObjectType,
        attributes: Map<String, Value>,
        workspace: Option<&WorkspaceId>,
        project: Option<&ProjectId>,
    ) -> Result<Option<ObjectId>, ResolverError> {
        if self.logger.passes_level(LogLevel::Debug) {
            let data = if object_type.has_opaque_payload() {
                "data".to_owned()
            } else {
                Value::Object(attributes.clone()).to_string()
            };
            self.logger.debug(&format!(
                "create_object {object_type}, {data}, {}, {}",
                display_opt(workspace),
                display_opt(project)
            ));
        }

        let spec = build_create_spec(object_type, attributes, workspace, project);
        let result = self
            .transport
            .create(&spec)
            .await
            .map_err(|e| self.transport_failure(e))?;
        self.logger
            .write_json(LogLevel::Debug, "res", &result, false);

        Ok(result.object.as_ref().and_then(Record::object_id))
    }

    /// Returns every record in `/{parent_type}/{parent_id}/{relation}`,
    /// across all pages, unmodified.
    ///
    /// # Errors
    ///
    /// The transport's error, logged at error level and otherwise unchanged.
    #[tracing::instrument(level = "debug", skip_all, fields(parent_type = %parent_type, parent_id = parent_id, relation = relation))]
    pub async fn list_child_objects(
        &self,
        parent_type: &ObjectType,
        parent_id: &str,
        relation: &str,
    ) -> Result<ResultSet, ResolverError> {
        self.logger.debug(&format!(
            "list_child_objects {parent_type}, {parent_id}, {relation}"
        ));
        let spec = build_child_listing_query(parent_type, parent_id, relation);
        let result = self.run_query(&spec).await?;
        self.logger
            .debug(&format!("list_child_objects returned {} records", result.results.len()));
        Ok(result.results)
    }

    /// Returns every test case in `test_folder`.
    ///
    /// # Errors
    ///
    /// The transport's error, logged at error level and otherwise unchanged.
    pub async fn list_test_cases(
        &self,
        test_folder: &TestFolderId,
    ) -> Result<ResultSet, ResolverError> {
        self.list_child_objects(
            &ObjectType::test_folder(),
            test_folder.as_str(),
            TEST_CASES_RELATION,
        )
        .await
    }

    /// Returns every test case in the configured test folder.
    ///
    /// # Errors
    ///
    /// The transport's error, logged at error level and otherwise unchanged.
    pub async fn list_configured_test_cases(&self) -> Result<ResultSet, ResolverError> {
        self.list_test_cases(&self.configured.test_folder).await
    }

    async fn first_object_id(&self, spec: &QuerySpec) -> Result<Option<ObjectId>, ResolverError> {
        let result = self.run_query(spec).await?;
        self.logger
            .write_json(LogLevel::Debug, "res", &result, false);
        Ok(result.results.first().and_then(Record::object_id))
    }

    async fn run_query(&self, spec: &QuerySpec) -> Result<QueryResult, ResolverError> {
        self.logger.write_json(LogLevel::Debug, "q", spec, false);
        self.transport
            .query(spec)
            .await
            .map_err(|e| self.transport_failure(e))
    }

    fn transport_failure(&self, err: TransportError) -> ResolverError {
        self.logger.error(&err.to_string());
        ResolverError::Transport(err)
    }
}

impl<T> std::fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("config", &self.config)
            .field("logger", &self.logger)
            .finish_non_exhaustive()
    }
}
