//! Event metadata and redaction.
//!
//! Every operation picks one [`EventMetadata`] variant. Variants render to
//! the open mapping stored on the record, with sensitive values replaced by
//! the configured redaction marker.

use serde_json::{Value, json};

use crate::config::AuditConfig;
use crate::tracking::{ChangeTracked, FieldMap};

/// Broker parameters that are echoed verbatim.
pub const BROKER_REQUEST_KEYS: [&str; 3] = ["name", "broker_url", "auth_username"];

/// Broker parameter that is only ever recorded as redacted.
pub const BROKER_PASSWORD_KEY: &str = "auth_password";

const REQUEST_KEY: &str = "request";
const REDIRECT_URI_KEY: &str = "redirect_uri";
const SECRET_KEY: &str = "secret";

/// Metadata payload of an audit event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventMetadata {
    /// No metadata.
    Empty,
    /// Caller-supplied request parameters, echoed as `{request: ...}`.
    Request(FieldMap),
    /// Allow-listed broker parameters plus whether a password was supplied.
    BrokerRequest {
        /// Allow-listed, non-null parameters.
        params: FieldMap,
        /// Whether an `auth_password` key was present.
        password_supplied: bool,
    },
    /// Fields of a catalog entity that are new or changed.
    CatalogDiff(FieldMap),
    /// Dashboard client change. The secret is never echoed.
    DashboardClientChange {
        /// Redirect URI, if supplied.
        redirect_uri: Option<Value>,
    },
    /// Service purge marker.
    Purge,
}

impl EventMetadata {
    /// Echoes request parameters as supplied.
    #[must_use]
    pub const fn request(params: FieldMap) -> Self {
        Self::Request(params)
    }

    /// Builds broker metadata from request parameters.
    ///
    /// Only `name`, `broker_url` and `auth_username` pass through; keys with
    /// a null value are dropped like absent ones. The presence of
    /// `auth_password` is recorded, never its value. Unrecognized keys are
    /// dropped. With nothing left, the result is [`EventMetadata::Empty`].
    #[must_use]
    pub fn broker_request(params: &FieldMap) -> Self {
        let allowed: FieldMap = BROKER_REQUEST_KEYS
            .iter()
            .filter_map(|key| {
                params
                    .get(*key)
                    .filter(|value| !value.is_null())
                    .map(|value| ((*key).to_string(), value.clone()))
            })
            .collect();
        let password_supplied = params.contains_key(BROKER_PASSWORD_KEY);

        if allowed.is_empty() && !password_supplied {
            return Self::Empty;
        }
        Self::BrokerRequest {
            params: allowed,
            password_supplied,
        }
    }

    /// Builds dashboard client metadata from catalog attributes.
    #[must_use]
    pub fn dashboard_client(attrs: &FieldMap) -> Self {
        Self::DashboardClientChange {
            redirect_uri: attrs.get(REDIRECT_URI_KEY).cloned(),
        }
    }

    /// Diffs a tracked entity against its persisted state.
    ///
    /// # Errors
    ///
    /// Fails if the entity's fields cannot be read.
    pub fn catalog_diff<M: ChangeTracked + ?Sized>(model: &M) -> crate::Result<Self> {
        Ok(Self::CatalogDiff(changes_for_modified_model(model)?))
    }

    /// Renders the open mapping stored on the record.
    #[must_use]
    pub fn into_map(self, config: &AuditConfig) -> FieldMap {
        let mut metadata = FieldMap::new();
        match self {
            Self::Empty => {}
            Self::Request(params) => {
                metadata.insert(REQUEST_KEY.to_string(), Value::Object(params));
            }
            Self::BrokerRequest {
                mut params,
                password_supplied,
            } => {
                if password_supplied {
                    params.insert(
                        BROKER_PASSWORD_KEY.to_string(),
                        Value::String(config.redaction_marker.clone()),
                    );
                }
                metadata.insert(REQUEST_KEY.to_string(), Value::Object(params));
            }
            Self::CatalogDiff(changes) => {
                metadata.insert(config.catalog_changes_key.clone(), Value::Object(changes));
            }
            Self::DashboardClientChange { redirect_uri } => {
                let mut changes = FieldMap::new();
                if let Some(redirect_uri) = redirect_uri {
                    changes.insert(
                        SECRET_KEY.to_string(),
                        Value::String(config.redaction_marker.clone()),
                    );
                    changes.insert(REDIRECT_URI_KEY.to_string(), redirect_uri);
                }
                metadata.insert(config.catalog_changes_key.clone(), Value::Object(changes));
            }
            Self::Purge => {
                metadata.insert(REQUEST_KEY.to_string(), json!({"purge": true}));
            }
        }
        metadata
    }
}

/// Collects every field that is new or modified since the last save.
///
/// # Errors
///
/// Fails if the entity's fields cannot be read.
pub fn changes_for_modified_model<M: ChangeTracked + ?Sized>(model: &M) -> crate::Result<FieldMap> {
    model.changed_fields()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;
    use test_case::test_case;

    fn map(value: Value) -> FieldMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn render(metadata: EventMetadata) -> Value {
        Value::Object(metadata.into_map(&AuditConfig::default()))
    }

    /// Change facts supplied directly, as a persistence layer would.
    struct FakeModel {
        fields: FieldMap,
        new: bool,
        modified: BTreeSet<String>,
    }

    impl ChangeTracked for FakeModel {
        fn is_new(&self) -> bool {
            self.new
        }

        fn was_modified(&self, field: &str) -> bool {
            self.modified.contains(field)
        }

        fn to_field_map(&self) -> crate::Result<FieldMap> {
            Ok(self.fields.clone())
        }
    }

    // ===========================================
    // Broker redaction
    // ===========================================

    #[test_case(json!({"auth_password": "x", "name": "n"}), json!({"request": {"name": "n", "auth_password": "[REDACTED]"}}) ; "password redacted")]
    #[test_case(json!({"name": "n"}), json!({"request": {"name": "n"}}) ; "no password key")]
    #[test_case(json!({}), json!({}) ; "empty params elide request")]
    #[test_case(json!({"auth_password": null}), json!({"request": {"auth_password": "[REDACTED]"}}) ; "null password still redacted")]
    #[test_case(json!({"auth_password": ""}), json!({"request": {"auth_password": "[REDACTED]"}}) ; "empty password still redacted")]
    #[test_case(json!({"space_guid": "s", "extra": 1}), json!({}) ; "unrecognized keys dropped")]
    #[test_case(json!({"name": null, "broker_url": "https://b"}), json!({"request": {"broker_url": "https://b"}}) ; "null values dropped")]
    #[test_case(
        json!({"name": "n", "broker_url": "https://b", "auth_username": "admin", "auth_password": "pw"}),
        json!({"request": {"name": "n", "broker_url": "https://b", "auth_username": "admin", "auth_password": "[REDACTED]"}})
        ; "all recognized keys"
    )]
    fn broker_request_shapes(params: Value, expected: Value) {
        let metadata = EventMetadata::broker_request(&map(params));
        assert_eq!(render(metadata), expected);
    }

    #[test]
    fn broker_password_value_never_rendered() {
        let metadata = EventMetadata::broker_request(&map(json!({"auth_password": "hunter2"})));
        let rendered = serde_json::to_string(&render(metadata)).expect("serializes");
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn custom_marker_is_used() {
        let config = AuditConfig {
            redaction_marker: "***".to_string(),
            ..AuditConfig::default()
        };
        let metadata = EventMetadata::broker_request(&map(json!({"auth_password": "pw"})));
        assert_eq!(
            Value::Object(metadata.into_map(&config)),
            json!({"request": {"auth_password": "***"}})
        );
    }

    // ===========================================
    // Dashboard clients
    // ===========================================

    #[test_case(
        json!({"id": "c1", "redirect_uri": "https://x"}),
        json!({"changes_from_broker_catalog": {"secret": "[REDACTED]", "redirect_uri": "https://x"}})
        ; "redirect uri present"
    )]
    #[test_case(json!({"id": "c1"}), json!({"changes_from_broker_catalog": {}}) ; "no redirect uri")]
    #[test_case(
        json!({"id": "c1", "secret": "s3cret", "redirect_uri": "https://x"}),
        json!({"changes_from_broker_catalog": {"secret": "[REDACTED]", "redirect_uri": "https://x"}})
        ; "supplied secret is hidden"
    )]
    #[test_case(json!({"id": "c1", "secret": "s3cret"}), json!({"changes_from_broker_catalog": {}}) ; "secret without redirect uri")]
    fn dashboard_client_shapes(attrs: Value, expected: Value) {
        let metadata = EventMetadata::dashboard_client(&map(attrs));
        assert_eq!(render(metadata), expected);
    }

    // ===========================================
    // Static shapes
    // ===========================================

    #[test]
    fn purge_marker() {
        assert_eq!(render(EventMetadata::Purge), json!({"request": {"purge": true}}));
    }

    #[test]
    fn empty_renders_empty_map() {
        assert_eq!(render(EventMetadata::Empty), json!({}));
    }

    #[test]
    fn request_echo_is_verbatim() {
        let params = map(json!({"name": "db", "parameters": {"size": 3}}));
        assert_eq!(
            render(EventMetadata::request(params)),
            json!({"request": {"name": "db", "parameters": {"size": 3}}})
        );
    }

    #[test]
    fn catalog_diff_uses_configured_key() {
        let config = AuditConfig {
            catalog_changes_key: "catalog".to_string(),
            ..AuditConfig::default()
        };
        let metadata = EventMetadata::CatalogDiff(map(json!({"a": 1})));
        assert_eq!(Value::Object(metadata.into_map(&config)), json!({"catalog": {"a": 1}}));
    }

    // ===========================================
    // Diffing
    // ===========================================

    #[test]
    fn only_modified_fields_are_recorded() {
        let model = FakeModel {
            fields: map(json!({"a": "new", "b": 2, "c": 3})),
            new: false,
            modified: BTreeSet::from(["a".to_string()]),
        };
        let changes = changes_for_modified_model(&model).expect("diff");
        assert_eq!(Value::Object(changes), json!({"a": "new"}));
    }

    fn fields_strategy() -> impl Strategy<Value = FieldMap> {
        prop::collection::btree_map("[a-z_]{1,12}", any::<i64>(), 0..12).prop_map(|fields| {
            fields
                .into_iter()
                .map(|(key, value)| (key, Value::from(value)))
                .collect::<FieldMap>()
        })
    }

    proptest! {
        #[test]
        fn new_entity_diff_is_full_snapshot(fields in fields_strategy()) {
            let model = FakeModel { fields: fields.clone(), new: true, modified: BTreeSet::new() };
            let changes = changes_for_modified_model(&model).expect("diff");
            prop_assert_eq!(changes, fields);
        }

        #[test]
        fn unmodified_entity_diff_is_empty(fields in fields_strategy()) {
            let model = FakeModel { fields, new: false, modified: BTreeSet::new() };
            let changes = changes_for_modified_model(&model).expect("diff");
            prop_assert!(changes.is_empty());
        }

        #[test]
        fn diff_contains_exactly_modified_fields(
            fields in fields_strategy(),
            mask in prop::collection::vec(any::<bool>(), 12),
        ) {
            let modified: BTreeSet<String> = fields
                .keys()
                .zip(mask.iter())
                .filter(|(_, selected)| **selected)
                .map(|(key, _)| key.clone())
                .collect();
            let model = FakeModel { fields: fields.clone(), new: false, modified: modified.clone() };

            let changes = changes_for_modified_model(&model).expect("diff");
            let keys: BTreeSet<String> = changes.keys().cloned().collect();
            prop_assert_eq!(&keys, &modified);
            for (key, value) in &changes {
                prop_assert_eq!(Some(value), fields.get(key));
            }
        }
    }
}
