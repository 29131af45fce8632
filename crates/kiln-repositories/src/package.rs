use std::sync::Arc;

use kiln_client::{AuthInfo, ClientFactory, RequestContext, ScopedClient};
use kiln_resources::CfPackageSpec;
use kiln_store::Patch;
use kiln_types::Guid;
use serde_json::json;

use crate::error::{Op, RepositoryError, RepositoryResult};
use crate::filter::{matches_filter, sort_by_creation};
use crate::mapper::{package_object, package_record, package_state};
use crate::messages::{CreatePackageMessage, ListPackagesMessage, UpdatePackageSourceMessage};
use crate::records::PackageRecord;

const RESOURCE: &str = "Package";

/// Application source packages, stored one per object in the app's space.
pub struct PackageRepository {
    factory: Arc<dyn ClientFactory>,
}

impl PackageRepository {
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self { factory }
    }

    fn client(&self, auth: &AuthInfo, op: &Op<'_>) -> RepositoryResult<ScopedClient> {
        self.factory
            .build_client(auth)
            .map_err(|e| op.client_error(e))
    }

    pub async fn create_package(
        &self,
        ctx: &RequestContext,
        auth: &AuthInfo,
        message: &CreatePackageMessage,
    ) -> RepositoryResult<PackageRecord> {
        let guid = Guid::generate().into_string();
        let op = Op::new("create package", RESOURCE, &guid);
        let client = self.client(auth, &op)?;

        let created = client
            .create(ctx, package_object(guid.clone(), message))
            .await
            .map_err(|e| op.store_error(e))?;
        tracing::debug!(guid = %guid, space = %message.space_guid, "created package");
        Ok(package_record(created))
    }

    /// Look a package up by GUID across every space the caller can see.
    ///
    /// GUIDs are only unique per space as far as the store is concerned, so
    /// more than one match is reported as a duplicate, never resolved.
    pub async fn get_package(
        &self,
        ctx: &RequestContext,
        auth: &AuthInfo,
        guid: &str,
    ) -> RepositoryResult<PackageRecord> {
        let op = Op::new("get package", RESOURCE, guid);
        let client = self.client(auth, &op)?;

        let mut matches: Vec<_> = client
            .list::<CfPackageSpec>(ctx, None)
            .await
            .map_err(|e| op.store_error(e))?
            .into_iter()
            .filter(|p| p.meta.name == guid)
            .collect();

        match matches.len() {
            0 => Err(op.not_found()),
            1 => Ok(package_record(matches.remove(0))),
            _ => Err(RepositoryError::DuplicateObject {
                resource: RESOURCE,
                guid: guid.to_string(),
            }),
        }
    }

    pub async fn list_packages(
        &self,
        ctx: &RequestContext,
        auth: &AuthInfo,
        message: &ListPackagesMessage,
    ) -> RepositoryResult<Vec<PackageRecord>> {
        let op = Op::new("list packages", RESOURCE, "");
        let client = self.client(auth, &op)?;

        let mut packages: Vec<_> = client
            .list::<CfPackageSpec>(ctx, None)
            .await
            .map_err(|e| op.store_error(e))?
            .into_iter()
            .filter(|p| {
                matches_filter(&message.app_guids, &p.spec.app_ref.name)
                    && matches_filter(&message.states, &package_state(&p.spec))
            })
            .collect();
        sort_by_creation(&mut packages, message.order);

        Ok(packages.into_iter().map(package_record).collect())
    }

    /// Record the uploaded source image, moving the package to `READY`.
    pub async fn update_package_source(
        &self,
        ctx: &RequestContext,
        auth: &AuthInfo,
        message: &UpdatePackageSourceMessage,
    ) -> RepositoryResult<PackageRecord> {
        let op = Op::new("update package source", RESOURCE, &message.guid);
        let client = self.client(auth, &op)?;

        let mut registry = json!({ "image": message.image_ref });
        if let Some(secret) = &message.registry_secret_name {
            registry["imagePullSecrets"] = json!([{ "name": secret }]);
        }
        let patch = Patch::merge(json!({ "source": { "registry": registry } }));

        let patched = client
            .patch::<CfPackageSpec>(ctx, &message.space_guid, &message.guid, &patch)
            .await
            .map_err(|e| op.store_error(e))?;
        tracing::debug!(guid = %message.guid, "patched package source");
        Ok(package_record(patched))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::SortOrder;
    use crate::records::PackageState;
    use crate::testing::{alice, bob, Fixture, OTHER_SPACE, SPACE};
    use kiln_resources::{Object, API_VERSION};
    use kiln_store::OwnerReference;
    use kiln_types::{parse_timestamp, ErrorKind};

    fn create_message(app: &str, space: &str) -> CreatePackageMessage {
        CreatePackageMessage {
            package_type: "bits".into(),
            app_guid: app.into(),
            space_guid: space.into(),
            owner_ref: OwnerReference {
                api_version: API_VERSION.into(),
                kind: "CFApp".into(),
                name: app.into(),
                uid: format!("{app}-uid"),
            },
        }
    }

    fn setup() -> (Fixture, PackageRepository) {
        let fx = Fixture::new();
        let repo = PackageRepository::new(Arc::clone(&fx.user));
        (fx, repo)
    }

    async fn upload(repo: &PackageRepository, record: &PackageRecord) -> PackageRecord {
        let message = UpdatePackageSourceMessage {
            guid: record.guid.clone(),
            space_guid: record.space_guid.clone(),
            image_ref: format!("registry.local/{}", record.guid),
            registry_secret_name: None,
        };
        repo.update_package_source(&RequestContext::background(), &alice(), &message)
            .await
            .unwrap()
    }

    // ---- Test 1: create assigns GUID and starts awaiting upload ----
    #[tokio::test]
    async fn create_package() {
        let (fx, repo) = setup();
        let ctx = RequestContext::background();
        let record = repo
            .create_package(&ctx, &alice(), &create_message("app-1", SPACE))
            .await
            .unwrap();

        assert!(record.guid.parse::<Guid>().is_ok());
        assert!(!record.uid.is_empty());
        assert_eq!(record.package_type, "bits");
        assert_eq!(record.app_guid, "app-1");
        assert_eq!(record.space_guid, SPACE);
        assert_eq!(record.state, PackageState::AwaitingUpload);
        assert!(parse_timestamp(&record.created_at).is_ok());

        let client = fx.user.build_client(&alice()).unwrap();
        let stored: Object<CfPackageSpec> = client.get(&ctx, SPACE, &record.guid).await.unwrap();
        assert_eq!(stored.meta.owner_references[0].name, "app-1");
    }

    #[tokio::test]
    async fn create_rejects_unknown_type() {
        let (_fx, repo) = setup();
        let mut message = create_message("app-1", SPACE);
        message.package_type = "tarball".into();
        let err = repo
            .create_package(&RequestContext::background(), &alice(), &message)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn create_without_permission_is_not_found() {
        let (_fx, repo) = setup();
        let err = repo
            .create_package(&RequestContext::background(), &bob(), &create_message("app-1", SPACE))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDeniedOrNotFound);
    }

    // ---- Test 2: get by GUID, missing and duplicated ----
    #[tokio::test]
    async fn get_package() {
        let (fx, repo) = setup();
        let ctx = RequestContext::background();
        let created = repo
            .create_package(&ctx, &alice(), &create_message("app-1", SPACE))
            .await
            .unwrap();

        let fetched = repo.get_package(&ctx, &alice(), &created.guid).await.unwrap();
        assert_eq!(fetched, created);

        let err = repo.get_package(&ctx, &alice(), "missing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDeniedOrNotFound);

        // Same name in another space.
        let client = fx.user.build_client(&alice()).unwrap();
        let twin = package_object(created.guid.clone(), &create_message("app-2", OTHER_SPACE));
        client.create(&ctx, twin).await.unwrap();

        let err = repo.get_package(&ctx, &alice(), &created.guid).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateObject);
        assert_eq!(err.to_string(), "duplicate package GUID exists");
    }

    // ---- Test 3: filters by app and state ----
    #[tokio::test]
    async fn list_filters_by_app_and_state() {
        let (_fx, repo) = setup();
        let ctx = RequestContext::background();

        let p1 = repo.create_package(&ctx, &alice(), &create_message("a1", SPACE)).await.unwrap();
        let p2 = repo.create_package(&ctx, &alice(), &create_message("a1", SPACE)).await.unwrap();
        let p3 = repo.create_package(&ctx, &alice(), &create_message("a2", SPACE)).await.unwrap();
        let ready = upload(&repo, &p2).await;
        upload(&repo, &p3).await;
        assert_eq!(ready.state, PackageState::Ready);

        let message = ListPackagesMessage {
            app_guids: vec!["a1".into()],
            states: vec![PackageState::Ready],
            ..Default::default()
        };
        let records = repo.list_packages(&ctx, &alice(), &message).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].guid, p2.guid);

        let all = repo
            .list_packages(&ctx, &alice(), &ListPackagesMessage::default())
            .await
            .unwrap();
        let guids: Vec<_> = all.iter().map(|r| r.guid.clone()).collect();
        assert_eq!(guids, [p1.guid.clone(), p2.guid.clone(), p3.guid.clone()]);

        let message = ListPackagesMessage {
            order: SortOrder::Descending,
            ..Default::default()
        };
        let desc = repo.list_packages(&ctx, &alice(), &message).await.unwrap();
        let guids: Vec<_> = desc.iter().map(|r| r.guid.clone()).collect();
        assert_eq!(guids, [p3.guid, p2.guid, p1.guid]);

        let message = ListPackagesMessage {
            app_guids: vec!["no-such-app".into()],
            ..Default::default()
        };
        assert!(repo.list_packages(&ctx, &alice(), &message).await.unwrap().is_empty());
    }

    // ---- Test 4: source update ----
    #[tokio::test]
    async fn update_source_sets_image_and_secret() {
        let (fx, repo) = setup();
        let ctx = RequestContext::background();
        let created = repo
            .create_package(&ctx, &alice(), &create_message("app-1", SPACE))
            .await
            .unwrap();

        let message = UpdatePackageSourceMessage {
            guid: created.guid.clone(),
            space_guid: SPACE.into(),
            image_ref: "registry.local/app-1@sha256:abc".into(),
            registry_secret_name: Some("registry-creds".into()),
        };
        let updated = repo.update_package_source(&ctx, &alice(), &message).await.unwrap();
        assert_eq!(updated.state, PackageState::Ready);
        assert_eq!(updated.image_ref, "registry.local/app-1@sha256:abc");
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(updated.created_at, created.created_at);

        let client = fx.user.build_client(&alice()).unwrap();
        let stored: Object<CfPackageSpec> = client.get(&ctx, SPACE, &created.guid).await.unwrap();
        assert_eq!(stored.spec.source.registry.image_pull_secrets[0].name, "registry-creds");
    }

    #[tokio::test]
    async fn update_missing_package_is_not_found() {
        let (_fx, repo) = setup();
        let message = UpdatePackageSourceMessage {
            guid: "missing".into(),
            space_guid: SPACE.into(),
            image_ref: "registry.local/x".into(),
            registry_secret_name: None,
        };
        let err = repo
            .update_package_source(&RequestContext::background(), &alice(), &message)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDeniedOrNotFound);
    }
}
