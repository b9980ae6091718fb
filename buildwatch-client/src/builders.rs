//! Builder-related status endpoints

use crate::MasterClient;
use crate::error::Result;
use buildwatch_core::dto::status::{BuildDetail, LatestBuild};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

impl MasterClient {
    // =============================================================================
    // Builder Discovery
    // =============================================================================

    /// List the names of all builders configured on the master
    ///
    /// # Returns
    /// Builder names in lexical order
    pub async fn builder_names(&self) -> Result<Vec<String>> {
        let builders: BTreeMap<String, JsonValue> = self.fetch(&["builders"]).await?;

        Ok(builders.into_keys().collect())
    }

    // =============================================================================
    // Builds
    // =============================================================================

    /// Get the most recent build of a builder
    ///
    /// # Arguments
    /// * `builder` - The builder name
    pub async fn latest_build(&self, builder: &str) -> Result<LatestBuild> {
        self.fetch(&["builders", builder, "builds", "-1"]).await
    }

    /// Get the details of a single build
    ///
    /// # Arguments
    /// * `builder` - The builder name
    /// * `number` - The build number
    pub async fn build_detail(&self, builder: &str, number: i64) -> Result<BuildDetail> {
        let number = number.to_string();
        self.fetch(&["builders", builder, "builds", number.as_str()]).await
    }
}
