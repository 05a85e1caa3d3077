//! Adapter contract.
//!
//! Backends that turn a canonical schema into an external artifact
//! (DDL scripts, Iceberg table metadata, Avro definitions) implement
//! [`SchemaAdapter`]. The core crate ships the diff and planning
//! machinery; adapters live in their own crates and only depend on the
//! canonical model.

use crate::schema::IceTypeSchema;

/// A backend transforming canonical schemas into an external format.
pub trait SchemaAdapter {
    /// The artifact the adapter produces.
    type Output;
    /// Per-call transformation options.
    type Options;
    /// The adapter's failure type.
    type Error: std::error::Error;

    /// A short stable name identifying the adapter, e.g. `"iceberg"`.
    fn name(&self) -> &'static str;

    /// The adapter's version string.
    fn version(&self) -> &'static str;

    /// Transforms a schema into the adapter's output format.
    ///
    /// # Errors
    ///
    /// Returns the adapter's error when the schema uses features the
    /// target format cannot express.
    fn transform(
        &self,
        schema: &IceTypeSchema,
        options: &Self::Options,
    ) -> Result<Self::Output, Self::Error>;

    /// Serializes an output artifact to text.
    fn serialize(&self, output: &Self::Output) -> String;

    /// Serializes an output artifact including secondary index
    /// definitions. Adapters without a separate index artifact fall
    /// back to [`serialize`](Self::serialize).
    fn serialize_with_indexes(&self, output: &Self::Output) -> String {
        self.serialize(output)
    }
}
