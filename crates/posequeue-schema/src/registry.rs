use std::collections::HashMap;
use std::fmt;

use jsonschema::Validator;
use posequeue_envelope::RecordKind;
use serde_json::Value;

use crate::config::RegistryConfig;
use crate::error::{Result, SchemaError};
use crate::validator::validate_payload;

/// Schema of the pose wire shape.
pub const POSE_SCHEMA: &str = include_str!("../schemas/pose.schema.json");

/// Schema of the label wire shape.
pub const LABEL_SCHEMA: &str = include_str!("../schemas/label.schema.json");

/// Compiled JSON Schema validators keyed by record kind.
pub struct SchemaRegistry {
    validators: HashMap<RecordKind, Validator>,
    config: RegistryConfig,
}

impl SchemaRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            validators: HashMap::new(),
            config,
        }
    }

    /// Registry holding [`POSE_SCHEMA`] and [`LABEL_SCHEMA`].
    pub fn builtin() -> Result<Self> {
        Self::builtin_with_config(RegistryConfig::default())
    }

    pub fn builtin_with_config(config: RegistryConfig) -> Result<Self> {
        let mut registry = Self::with_config(config);
        registry.register(RecordKind::Pose, POSE_SCHEMA)?;
        registry.register(RecordKind::Label, LABEL_SCHEMA)?;
        Ok(registry)
    }

    /// Register a schema for a record kind from a JSON string.
    pub fn register(&mut self, kind: RecordKind, schema_json: &str) -> Result<()> {
        let schema: Value = serde_json::from_str(schema_json)?;
        self.register_value(kind, &schema)
    }

    /// Register a schema for a record kind from a JSON value.
    ///
    /// Replaces any schema already registered for `kind`.
    pub fn register_value(&mut self, kind: RecordKind, schema: &Value) -> Result<()> {
        let compiled = jsonschema::validator_for(schema)
            .map_err(|err| SchemaError::CompileFailed(err.to_string()))?;

        tracing::debug!(%kind, "schema registered");
        self.validators.insert(kind, compiled);
        Ok(())
    }

    /// Validate a wire payload against the schema of its record kind.
    pub fn validate(&self, kind: RecordKind, payload: &[u8]) -> Result<()> {
        match self.validators.get(&kind) {
            Some(validator) => validate_payload(kind, payload, validator),
            None if self.config.fail_on_missing_schema => Err(SchemaError::NoSchema(kind)),
            None => Ok(()),
        }
    }

    pub fn has_schema(&self, kind: RecordKind) -> bool {
        self.validators.contains_key(&kind)
    }

    /// Record kinds that have a registered schema, in order.
    pub fn kinds(&self) -> Vec<RecordKind> {
        let mut kinds: Vec<RecordKind> = self.validators.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("kinds", &self.kinds())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use posequeue_envelope::{encode_label, encode_pose, to_wire};

    use super::*;

    const OPEN_LABEL_SCHEMA: &str = r#"{
        "type": "object",
        "properties": {
            "label": { "type": "string" },
            "bbox": { "type": "array", "items": { "type": "number" } }
        },
        "required": ["label", "bbox"]
    }"#;

    fn pose_wire(point_count: usize) -> String {
        let points = vec![[1.0, 2.0]; point_count];
        let envelope = encode_pose(3, 0, &[289.0, 1035.0, 174.0, 540.0], &points, &[0.9; 17]);
        match envelope {
            Ok(envelope) => to_wire(&envelope),
            // Hand-build the oversized payload that encode would refuse.
            Err(_) => format!(
                r#"{{"frame_id":3,"person_id":0,"bbox":[1,2,3,4],"keypoints":{},"keypoint_scores":{}}}"#,
                serde_json::to_string(&points).unwrap(),
                serde_json::to_string(&[0.9; 17]).unwrap()
            ),
        }
    }

    #[test]
    fn builtin_accepts_encoded_records() {
        let registry = SchemaRegistry::builtin().unwrap();
        assert_eq!(registry.kinds(), vec![RecordKind::Pose, RecordKind::Label]);

        assert!(registry
            .validate(RecordKind::Pose, pose_wire(17).as_bytes())
            .is_ok());
        let label = to_wire(&encode_label("Falling", &[289.0, 1035.0, 174.0, 540.0]).unwrap());
        assert!(registry.validate(RecordKind::Label, label.as_bytes()).is_ok());
    }

    #[test]
    fn builtin_rejects_wrong_keypoint_count() {
        let registry = SchemaRegistry::builtin().unwrap();
        let err = registry
            .validate(RecordKind::Pose, pose_wire(16).as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::ValidationFailed {
                kind: RecordKind::Pose,
                ..
            }
        ));
    }

    #[test]
    fn builtin_rejects_cross_kind_payloads() {
        let registry = SchemaRegistry::builtin().unwrap();
        let label = br#"{"label":"Falling","bbox":[1,2,3,4]}"#;
        assert!(registry.validate(RecordKind::Pose, label).is_err());
        assert!(registry
            .validate(RecordKind::Label, pose_wire(17).as_bytes())
            .is_err());
    }

    #[test]
    fn builtin_rejects_negative_frame_id() {
        let registry = SchemaRegistry::builtin().unwrap();
        let wire = pose_wire(17).replace(r#""frame_id":3"#, r#""frame_id":-3"#);
        assert!(matches!(
            registry.validate(RecordKind::Pose, wire.as_bytes()),
            Err(SchemaError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn missing_schema_permissive_passes() {
        let registry = SchemaRegistry::new();
        assert!(registry.validate(RecordKind::Label, b"{}").is_ok());
    }

    #[test]
    fn missing_schema_strict_fails() {
        let registry = SchemaRegistry::with_config(RegistryConfig {
            fail_on_missing_schema: true,
            ..RegistryConfig::default()
        });
        assert!(matches!(
            registry.validate(RecordKind::Pose, b"{}"),
            Err(SchemaError::NoSchema(RecordKind::Pose))
        ));
    }

    #[test]
    fn registered_schema_replaces_builtin() {
        let mut registry = SchemaRegistry::builtin().unwrap();
        let payload = br#"{"label":"Falling","bbox":[1,2,3,4],"score":0.7}"#;
        assert!(registry.validate(RecordKind::Label, payload).is_err());

        registry
            .register(RecordKind::Label, OPEN_LABEL_SCHEMA)
            .unwrap();
        assert!(registry.validate(RecordKind::Label, payload).is_ok());
        assert!(registry.has_schema(RecordKind::Pose));
    }

    #[test]
    fn invalid_json_payload_fails() {
        let registry = SchemaRegistry::builtin().unwrap();
        assert!(matches!(
            registry.validate(RecordKind::Label, b"not-json"),
            Err(SchemaError::InvalidJson(_))
        ));
    }

    #[test]
    fn invalid_schema_fails_compile() {
        let mut registry = SchemaRegistry::new();
        assert!(matches!(
            registry.register(RecordKind::Pose, r#"{"type":"definitely-not-a-type"}"#),
            Err(SchemaError::CompileFailed(_))
        ));
        assert!(!registry.has_schema(RecordKind::Pose));
    }
}
