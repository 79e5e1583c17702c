/// Controls schema validation behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryConfig {
    /// When true, a record kind without a schema fails with
    /// [`SchemaError::NoSchema`](crate::SchemaError::NoSchema).
    pub fail_on_missing_schema: bool,
}
