//! Annotation change events

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::annotations::AnnotationKind;
use crate::metadata::PageInfo;

/// Nature of a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationType {
    Create,
    Update,
    Delete,
}

/// A change to one annotation record delivered by a listener
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationEvent {
    /// Id of the changed record
    pub id: String,
    pub kind: AnnotationKind,
    #[serde(rename = "mutationType")]
    pub mutation: MutationType,
    /// Raw record after the change
    #[serde(default)]
    pub value: Option<Value>,
    /// Raw record before the change
    #[serde(default)]
    pub previous_value: Option<Value>,
    /// Page the record lives on
    #[serde(rename = "pageInfo")]
    pub page: PageInfo,
}

impl AnnotationEvent {
    fn new(id: &str, kind: AnnotationKind, mutation: MutationType, page: u32) -> Self {
        Self {
            id: id.to_string(),
            kind,
            mutation,
            value: None,
            previous_value: None,
            page: PageInfo { num: page },
        }
    }

    /// Record created
    pub fn created(id: &str, kind: AnnotationKind, page: u32, value: Value) -> Self {
        Self::new(id, kind, MutationType::Create, page).with_value(value)
    }

    /// Record updated
    pub fn updated(id: &str, kind: AnnotationKind, page: u32, value: Value) -> Self {
        Self::new(id, kind, MutationType::Update, page).with_value(value)
    }

    /// Record deleted
    pub fn deleted(id: &str, kind: AnnotationKind, page: u32) -> Self {
        Self::new(id, kind, MutationType::Delete, page)
    }

    /// Set the value after the change
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Set the value before the change
    pub fn with_previous(mut self, previous_value: Value) -> Self {
        self.previous_value = Some(previous_value);
        self
    }

    /// Value after the change, ignoring JSON null
    pub fn present_value(&self) -> Option<&Value> {
        self.value.as_ref().filter(|v| !v.is_null())
    }

    /// Value before the change, ignoring JSON null
    pub fn present_previous_value(&self) -> Option<&Value> {
        self.previous_value.as_ref().filter(|v| !v.is_null())
    }
}
