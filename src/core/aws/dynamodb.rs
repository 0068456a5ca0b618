use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;

use crate::core::error::ReportError;

const SERVICE: &str = "DynamoDB";
const PARTITION_KEY: &str = "period";
const VALUE_ATTRIBUTE: &str = "last_processed";

/// Single-attribute key-value store backing the idempotency guard.
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, ReportError>;
    async fn put(&self, key: &str, value: &str) -> Result<(), ReportError>;
}

/// One item per key in a table whose partition key is `period` (string).
pub struct DynamoStore {
    client: Client,
    table: String,
}

impl DynamoStore {
    pub fn new(sdk: &aws_config::SdkConfig, table: impl Into<String>) -> Self {
        Self {
            client: Client::new(sdk),
            table: table.into(),
        }
    }
}

#[async_trait]
impl IdempotencyStore for DynamoStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ReportError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(PARTITION_KEY, AttributeValue::S(key.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| ReportError::upstream(SERVICE, DisplayErrorContext(&e)))?;

        Ok(output
            .item()
            .and_then(|item| item.get(VALUE_ATTRIBUTE))
            .and_then(|value| value.as_s().ok())
            .cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), ReportError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .item(PARTITION_KEY, AttributeValue::S(key.to_string()))
            .item(VALUE_ATTRIBUTE, AttributeValue::S(value.to_string()))
            .send()
            .await
            .map_err(|e| ReportError::upstream(SERVICE, DisplayErrorContext(&e)))?;
        Ok(())
    }
}
