//! Amazon SimpleDB actions.
//!
//! Attribute and item indices in parameter names are 0-based.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::action::{Action, Service};
use crate::client::Client;
use crate::error::{AwsError, Result};
use crate::request::Request;
use crate::response::ResponseMetadata;
use crate::transport::Transport;

static DOMAIN_NAME_REGEX: OnceLock<Regex> = OnceLock::new();

fn domain_name_regex() -> &'static Regex {
    DOMAIN_NAME_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9_.\-]{3,255}$").expect("Invalid DOMAIN_NAME_REGEX pattern")
    })
}

/// Validates a SimpleDB domain name: 3-255 characters of `a-z A-Z 0-9 _ - .`.
fn validate_domain_name(name: &str) -> Result<()> {
    if !domain_name_regex().is_match(name) {
        return Err(AwsError::Validation(format!(
            "Invalid domain name '{}'. Expected 3-255 characters from a-z, A-Z, 0-9, '_', '-', '.'",
            name
        )));
    }
    Ok(())
}

/// Response of actions that only return metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SdbResponse {
    #[serde(rename = "ResponseMetadata", default)]
    pub metadata: ResponseMetadata,
}

/// An attribute to store, optionally replacing existing values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceableAttribute {
    pub name: String,
    pub value: String,
    pub replace: bool,
}

impl ReplaceableAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            replace: false,
        }
    }

    pub fn replacing(mut self) -> Self {
        self.replace = true;
        self
    }
}

/// An attribute to delete; without a value every value of the attribute goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletableAttribute {
    pub name: String,
    pub value: Option<String>,
}

/// Conditional update guard (`Expected.N.*`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateCondition {
    pub name: String,
    pub value: Option<String>,
    pub exists: Option<bool>,
}

fn add_conditions(request: &mut Request, expected: &[UpdateCondition]) {
    for (x, cond) in expected.iter().enumerate() {
        request.add(format!("Expected.{x}.Name"), cond.name.clone());
        if let Some(ref value) = cond.value {
            request.add(format!("Expected.{x}.Value"), value.clone());
        }
        if let Some(exists) = cond.exists {
            request.add(format!("Expected.{x}.Exists"), exists.to_string());
        }
    }
}

/// A name/value pair as returned by GetAttributes and Select.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Attribute {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value", default)]
    pub value: String,
}

// ListDomains

#[derive(Debug, Clone, Default)]
pub struct ListDomains {
    pub max_number_of_domains: Option<u32>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListDomainsResult {
    #[serde(rename = "DomainName", default)]
    pub domain_names: Vec<String>,
    #[serde(rename = "NextToken", default)]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListDomainsResponse {
    #[serde(rename = "ListDomainsResult", default)]
    pub result: ListDomainsResult,
    #[serde(rename = "ResponseMetadata", default)]
    pub metadata: ResponseMetadata,
}

impl Action for ListDomains {
    const NAME: &'static str = "ListDomains";
    const SERVICE: Service = Service::SimpleDb;
    type Response = ListDomainsResponse;

    fn add_params(&self, request: &mut Request) {
        if let Some(max) = self.max_number_of_domains {
            request.add("MaxNumberOfDomains", max.to_string());
        }
        if let Some(ref token) = self.next_token {
            request.add("NextToken", token.clone());
        }
    }
}

// CreateDomain / DeleteDomain / DomainMetadata

#[derive(Debug, Clone)]
pub struct CreateDomain {
    pub domain_name: String,
}

impl Action for CreateDomain {
    const NAME: &'static str = "CreateDomain";
    const SERVICE: Service = Service::SimpleDb;
    type Response = SdbResponse;

    fn add_params(&self, request: &mut Request) {
        request.add("DomainName", self.domain_name.clone());
    }

    fn validate(&self) -> Result<()> {
        validate_domain_name(&self.domain_name)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteDomain {
    pub domain_name: String,
}

impl Action for DeleteDomain {
    const NAME: &'static str = "DeleteDomain";
    const SERVICE: Service = Service::SimpleDb;
    type Response = SdbResponse;

    fn add_params(&self, request: &mut Request) {
        request.add("DomainName", self.domain_name.clone());
    }

    fn validate(&self) -> Result<()> {
        validate_domain_name(&self.domain_name)
    }
}

#[derive(Debug, Clone)]
pub struct DomainMetadata {
    pub domain_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DomainMetadataResult {
    #[serde(rename = "ItemCount", default)]
    pub item_count: u64,
    #[serde(rename = "ItemNamesSizeBytes", default)]
    pub item_names_size_bytes: u64,
    #[serde(rename = "AttributeNameCount", default)]
    pub attribute_name_count: u64,
    #[serde(rename = "AttributeNamesSizeBytes", default)]
    pub attribute_names_size_bytes: u64,
    #[serde(rename = "AttributeValueCount", default)]
    pub attribute_value_count: u64,
    #[serde(rename = "AttributeValuesSizeBytes", default)]
    pub attribute_values_size_bytes: u64,
    /// Unix seconds at which the metadata was computed.
    #[serde(rename = "Timestamp", default)]
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DomainMetadataResponse {
    #[serde(rename = "DomainMetadataResult", default)]
    pub result: DomainMetadataResult,
    #[serde(rename = "ResponseMetadata", default)]
    pub metadata: ResponseMetadata,
}

impl Action for DomainMetadata {
    const NAME: &'static str = "DomainMetadata";
    const SERVICE: Service = Service::SimpleDb;
    type Response = DomainMetadataResponse;

    fn add_params(&self, request: &mut Request) {
        request.add("DomainName", self.domain_name.clone());
    }

    fn validate(&self) -> Result<()> {
        validate_domain_name(&self.domain_name)
    }
}

// PutAttributes / BatchPutAttributes

#[derive(Debug, Clone, Default)]
pub struct PutAttributes {
    pub domain_name: String,
    pub item_name: String,
    pub attributes: Vec<ReplaceableAttribute>,
    pub expected: Vec<UpdateCondition>,
}

impl Action for PutAttributes {
    const NAME: &'static str = "PutAttributes";
    const SERVICE: Service = Service::SimpleDb;
    type Response = SdbResponse;

    fn add_params(&self, request: &mut Request) {
        request.add("DomainName", self.domain_name.clone());
        request.add("ItemName", self.item_name.clone());
        for (x, attr) in self.attributes.iter().enumerate() {
            request.add(format!("Attribute.{x}.Name"), attr.name.clone());
            request.add(format!("Attribute.{x}.Value"), attr.value.clone());
            if attr.replace {
                request.add(format!("Attribute.{x}.Replace"), "true");
            }
        }
        add_conditions(request, &self.expected);
    }

    fn validate(&self) -> Result<()> {
        validate_domain_name(&self.domain_name)
    }
}

/// An item and the attributes to store on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceableItem {
    pub name: String,
    pub attributes: Vec<ReplaceableAttribute>,
}

#[derive(Debug, Clone, Default)]
pub struct BatchPutAttributes {
    pub domain_name: String,
    pub items: Vec<ReplaceableItem>,
}

impl Action for BatchPutAttributes {
    const NAME: &'static str = "BatchPutAttributes";
    const SERVICE: Service = Service::SimpleDb;
    type Response = SdbResponse;

    fn add_params(&self, request: &mut Request) {
        request.add("DomainName", self.domain_name.clone());
        for (y, item) in self.items.iter().enumerate() {
            request.add(format!("Item.{y}.ItemName"), item.name.clone());
            for (x, attr) in item.attributes.iter().enumerate() {
                request.add(format!("Item.{y}.Attribute.{x}.Name"), attr.name.clone());
                request.add(format!("Item.{y}.Attribute.{x}.Value"), attr.value.clone());
                if attr.replace {
                    request.add(format!("Item.{y}.Attribute.{x}.Replace"), "true");
                }
            }
        }
    }

    fn validate(&self) -> Result<()> {
        validate_domain_name(&self.domain_name)
    }
}

// GetAttributes

#[derive(Debug, Clone, Default)]
pub struct GetAttributes {
    pub domain_name: String,
    pub item_name: String,
    /// Restricts the result to these attributes; empty means all.
    pub attribute_names: Vec<String>,
    pub consistent_read: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetAttributesResult {
    #[serde(rename = "Attribute", default)]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetAttributesResponse {
    #[serde(rename = "GetAttributesResult", default)]
    pub result: GetAttributesResult,
    #[serde(rename = "ResponseMetadata", default)]
    pub metadata: ResponseMetadata,
}

impl Action for GetAttributes {
    const NAME: &'static str = "GetAttributes";
    const SERVICE: Service = Service::SimpleDb;
    type Response = GetAttributesResponse;

    fn add_params(&self, request: &mut Request) {
        request.add("DomainName", self.domain_name.clone());
        request.add("ItemName", self.item_name.clone());
        for (x, name) in self.attribute_names.iter().enumerate() {
            request.add(format!("AttributeName.{x}"), name.clone());
        }
        if self.consistent_read {
            request.add("ConsistentRead", "true");
        }
    }

    fn validate(&self) -> Result<()> {
        validate_domain_name(&self.domain_name)
    }
}

// DeleteAttributes / BatchDeleteAttributes

#[derive(Debug, Clone, Default)]
pub struct DeleteAttributes {
    pub domain_name: String,
    pub item_name: String,
    /// Attributes to delete; empty deletes the whole item.
    pub attributes: Vec<DeletableAttribute>,
    pub expected: Vec<UpdateCondition>,
}

impl Action for DeleteAttributes {
    const NAME: &'static str = "DeleteAttributes";
    const SERVICE: Service = Service::SimpleDb;
    type Response = SdbResponse;

    fn add_params(&self, request: &mut Request) {
        request.add("DomainName", self.domain_name.clone());
        request.add("ItemName", self.item_name.clone());
        for (x, attr) in self.attributes.iter().enumerate() {
            request.add(format!("Attribute.{x}.Name"), attr.name.clone());
            if let Some(ref value) = attr.value {
                request.add(format!("Attribute.{x}.Value"), value.clone());
            }
        }
        add_conditions(request, &self.expected);
    }

    fn validate(&self) -> Result<()> {
        validate_domain_name(&self.domain_name)
    }
}

/// An item and the attributes to delete from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletableItem {
    pub name: String,
    pub attributes: Vec<DeletableAttribute>,
}

#[derive(Debug, Clone, Default)]
pub struct BatchDeleteAttributes {
    pub domain_name: String,
    pub items: Vec<DeletableItem>,
}

impl Action for BatchDeleteAttributes {
    const NAME: &'static str = "BatchDeleteAttributes";
    const SERVICE: Service = Service::SimpleDb;
    type Response = SdbResponse;

    fn add_params(&self, request: &mut Request) {
        request.add("DomainName", self.domain_name.clone());
        for (y, item) in self.items.iter().enumerate() {
            request.add(format!("Item.{y}.ItemName"), item.name.clone());
            for (x, attr) in item.attributes.iter().enumerate() {
                request.add(format!("Item.{y}.Attribute.{x}.Name"), attr.name.clone());
                if let Some(ref value) = attr.value {
                    request.add(format!("Item.{y}.Attribute.{x}.Value"), value.clone());
                }
            }
        }
    }

    fn validate(&self) -> Result<()> {
        validate_domain_name(&self.domain_name)
    }
}

// Select

#[derive(Debug, Clone, Default)]
pub struct Select {
    pub select_expression: String,
    pub next_token: Option<String>,
    pub consistent_read: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Item {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Attribute", default)]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectResult {
    #[serde(rename = "Item", default)]
    pub items: Vec<Item>,
    #[serde(rename = "NextToken", default)]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectResponse {
    #[serde(rename = "SelectResult", default)]
    pub result: SelectResult,
    #[serde(rename = "ResponseMetadata", default)]
    pub metadata: ResponseMetadata,
}

impl Action for Select {
    const NAME: &'static str = "Select";
    const SERVICE: Service = Service::SimpleDb;
    type Response = SelectResponse;

    fn add_params(&self, request: &mut Request) {
        request.add("SelectExpression", self.select_expression.clone());
        if let Some(ref token) = self.next_token {
            request.add("NextToken", token.clone());
        }
        if self.consistent_read {
            request.add("ConsistentRead", "true");
        }
    }

    fn validate(&self) -> Result<()> {
        if self.select_expression.trim().is_empty() {
            return Err(AwsError::Validation("empty select expression".into()));
        }
        Ok(())
    }
}

impl<T: Transport> Client<T> {
    /// Lists the domains owned by the account.
    pub async fn list_domains(
        &self,
        max_number_of_domains: Option<u32>,
        next_token: Option<String>,
    ) -> Result<ListDomainsResponse> {
        self.call(&ListDomains {
            max_number_of_domains,
            next_token,
        })
        .await
    }

    pub async fn create_domain(&self, domain_name: impl Into<String>) -> Result<SdbResponse> {
        self.call(&CreateDomain {
            domain_name: domain_name.into(),
        })
        .await
    }

    pub async fn delete_domain(&self, domain_name: impl Into<String>) -> Result<SdbResponse> {
        self.call(&DeleteDomain {
            domain_name: domain_name.into(),
        })
        .await
    }

    pub async fn domain_metadata(
        &self,
        domain_name: impl Into<String>,
    ) -> Result<DomainMetadataResponse> {
        self.call(&DomainMetadata {
            domain_name: domain_name.into(),
        })
        .await
    }

    pub async fn put_attributes(&self, request: &PutAttributes) -> Result<SdbResponse> {
        self.call(request).await
    }

    pub async fn batch_put_attributes(&self, request: &BatchPutAttributes) -> Result<SdbResponse> {
        self.call(request).await
    }

    pub async fn get_attributes(&self, request: &GetAttributes) -> Result<GetAttributesResponse> {
        self.call(request).await
    }

    pub async fn delete_attributes(&self, request: &DeleteAttributes) -> Result<SdbResponse> {
        self.call(request).await
    }

    pub async fn batch_delete_attributes(
        &self,
        request: &BatchDeleteAttributes,
    ) -> Result<SdbResponse> {
        self.call(request).await
    }

    /// Runs a select expression.
    pub async fn select(&self, request: &Select) -> Result<SelectResponse> {
        self.call(request).await
    }
}
