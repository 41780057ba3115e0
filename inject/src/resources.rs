use std::collections::BTreeMap;

use k8s_openapi::{
    api::core::v1::ResourceRequirements, apimachinery::pkg::api::resource::Quantity,
};

use crate::{
    error::{InjectError, ResourceField, Result},
    quantity::parse_quantity,
};

/// Builds the sidecar's requests/limits from four optional quantity strings.
///
/// Requests and limits are independent groups; a group with neither field
/// present contributes nothing to the spec, rather than an empty map. The
/// first invalid quantity aborts the whole call, so a partial spec is never
/// returned.
pub fn sidecar_resources(
    cpu_request: Option<&str>,
    memory_request: Option<&str>,
    cpu_limit: Option<&str>,
    memory_limit: Option<&str>,
) -> Result<ResourceRequirements> {
    Ok(ResourceRequirements {
        requests: resource_group(
            (ResourceField::CpuRequest, cpu_request),
            (ResourceField::MemoryRequest, memory_request),
        )?,
        limits: resource_group(
            (ResourceField::CpuLimit, cpu_limit),
            (ResourceField::MemoryLimit, memory_limit),
        )?,
        ..Default::default()
    })
}

fn resource_group(
    cpu: (ResourceField, Option<&str>),
    memory: (ResourceField, Option<&str>),
) -> Result<Option<BTreeMap<String, Quantity>>> {
    let mut group = BTreeMap::new();

    for (name, (field, value)) in [("cpu", cpu), ("memory", memory)] {
        let Some(value) = value.filter(|value| !value.is_empty()) else {
            continue;
        };

        let quantity =
            parse_quantity(value).map_err(|source| InjectError::InvalidQuantity {
                field,
                value: value.to_owned(),
                source,
            })?;
        group.insert(name.to_owned(), quantity);
    }

    Ok((!group.is_empty()).then_some(group))
}
