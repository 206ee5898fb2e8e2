//! CustomResourceDefinition for MapReduceJob
//!
//! Built by hand rather than derived: the resource keeps `status` and `err`
//! as top-level strings, which the derive macro would turn into a status
//! subresource.

use std::collections::BTreeMap;

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::{
    CustomResourceColumnDefinition, CustomResourceDefinition, CustomResourceDefinitionNames,
    CustomResourceDefinitionSpec, CustomResourceDefinitionVersion, CustomResourceValidation,
    JSONSchemaProps, JSONSchemaPropsOrArray, JSONSchemaPropsOrBool,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use super::job::{JOB_GROUP, JOB_KIND, JOB_PLURAL, JOB_SHORT_NAME, JOB_SINGULAR, JOB_VERSION};
use crate::Error;

/// Name of the MapReduceJob CustomResourceDefinition (`<plural>.<group>`)
pub const JOB_CRD_NAME: &str = "mapreducejobs.turbobytes.com";

/// Human description stored on the type descriptor
pub const JOB_CRD_DESCRIPTION: &str = "Map reduce job specification";

fn string_prop(description: &str) -> JSONSchemaProps {
    JSONSchemaProps {
        type_: Some("string".to_string()),
        description: Some(description.to_string()),
        ..Default::default()
    }
}

fn count_prop(description: &str) -> JSONSchemaProps {
    JSONSchemaProps {
        type_: Some("integer".to_string()),
        format: Some("int32".to_string()),
        minimum: Some(0.0),
        description: Some(description.to_string()),
        ..Default::default()
    }
}

fn string_list_prop(description: &str) -> JSONSchemaProps {
    JSONSchemaProps {
        type_: Some("array".to_string()),
        items: Some(JSONSchemaPropsOrArray::Schema(Box::new(JSONSchemaProps {
            type_: Some("string".to_string()),
            ..Default::default()
        }))),
        description: Some(description.to_string()),
        ..Default::default()
    }
}

/// Field types for `spec`, so admission rejects values the operator cannot
/// decode. Semantic checks (non-empty image, at least one reducer) stay in
/// the operator, which reports them through `err`.
fn spec_schema() -> JSONSchemaProps {
    let properties = BTreeMap::from([
        ("image".to_string(), string_prop("Container image running the job")),
        ("replicas".to_string(), count_prop("Number of worker replicas")),
        ("inputs".to_string(), string_list_prop("Input locations, one map task each")),
        ("reduceCount".to_string(), count_prop("Number of reduce partitions")),
        ("args".to_string(), string_list_prop("Extra arguments for the job image")),
        (
            "env".to_string(),
            JSONSchemaProps {
                type_: Some("object".to_string()),
                additional_properties: Some(JSONSchemaPropsOrBool::Schema(Box::new(
                    JSONSchemaProps {
                        type_: Some("string".to_string()),
                        ..Default::default()
                    },
                ))),
                description: Some("Environment variables for the job image".to_string()),
                ..Default::default()
            },
        ),
    ]);

    JSONSchemaProps {
        type_: Some("object".to_string()),
        description: Some(JOB_CRD_DESCRIPTION.to_string()),
        properties: Some(properties),
        // Fields added by newer clients are kept, not pruned
        x_kubernetes_preserve_unknown_fields: Some(true),
        ..Default::default()
    }
}

fn job_schema() -> JSONSchemaProps {
    let mut properties = BTreeMap::new();
    properties.insert("spec".to_string(), spec_schema());
    properties.insert(
        "status".to_string(),
        string_prop("Lifecycle status; empty until the operator validates the spec"),
    );
    properties.insert(
        "err".to_string(),
        string_prop("Reason the job was marked Fail"),
    );

    JSONSchemaProps {
        type_: Some("object".to_string()),
        description: Some(JOB_CRD_DESCRIPTION.to_string()),
        properties: Some(properties),
        ..Default::default()
    }
}

/// Build the MapReduceJob type descriptor
pub fn job_crd() -> CustomResourceDefinition {
    let mut annotations = BTreeMap::new();
    annotations.insert(
        format!("{JOB_GROUP}/description"),
        JOB_CRD_DESCRIPTION.to_string(),
    );

    CustomResourceDefinition {
        metadata: ObjectMeta {
            name: Some(JOB_CRD_NAME.to_string()),
            annotations: Some(annotations),
            ..Default::default()
        },
        spec: CustomResourceDefinitionSpec {
            group: JOB_GROUP.to_string(),
            names: CustomResourceDefinitionNames {
                kind: JOB_KIND.to_string(),
                list_kind: Some(format!("{JOB_KIND}List")),
                plural: JOB_PLURAL.to_string(),
                singular: Some(JOB_SINGULAR.to_string()),
                short_names: Some(vec![JOB_SHORT_NAME.to_string()]),
                categories: None,
            },
            scope: "Namespaced".to_string(),
            versions: vec![CustomResourceDefinitionVersion {
                name: JOB_VERSION.to_string(),
                served: true,
                storage: true,
                schema: Some(CustomResourceValidation {
                    open_api_v3_schema: Some(job_schema()),
                }),
                additional_printer_columns: Some(vec![
                    CustomResourceColumnDefinition {
                        name: "Status".to_string(),
                        type_: "string".to_string(),
                        json_path: ".status".to_string(),
                        ..Default::default()
                    },
                    CustomResourceColumnDefinition {
                        name: "Age".to_string(),
                        type_: "date".to_string(),
                        json_path: ".metadata.creationTimestamp".to_string(),
                        ..Default::default()
                    },
                ]),
                ..Default::default()
            }],
            ..Default::default()
        },
        status: None,
    }
}

/// Render the type descriptor as YAML (for `kubectl apply -f`)
pub fn job_crd_yaml() -> Result<String, Error> {
    serde_yaml::to_string(&job_crd()).map_err(|e| {
        Error::serialization_for_kind("CustomResourceDefinition", e.to_string())
    })
}
