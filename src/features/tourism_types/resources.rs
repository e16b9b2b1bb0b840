use crate::core::store::{FieldValue, Record};
use crate::features::auth::policy::{Policy, ResourcePolicy};
use crate::features::catalog::query::{FieldKind, FilterField};
use crate::features::catalog::resource::Resource;
use crate::features::tourism_types::dtos::TourismTypeInputDto;
use crate::features::tourism_types::models::TourismType;
use crate::shared::validation::{require, FieldErrors};

pub struct TourismTypeResource;

impl Resource for TourismTypeResource {
    type Model = TourismType;
    type CreateDto = TourismTypeInputDto;
    type UpdateDto = TourismTypeInputDto;

    const TABLE: &'static str = "tourism_types";
    const PATH: &'static str = "tourism-types";
    const LABEL: &'static str = "Tourism type";
    const POLICY: ResourcePolicy = ResourcePolicy {
        read: Policy::AdminOnly,
        write: Policy::AdminOnly,
        create: Policy::AdminOnly,
    };
    const FILTER_FIELDS: &'static [FilterField] = &[
        FilterField::new("name", FieldKind::Text),
        FilterField::new("is_active", FieldKind::Boolean),
    ];
    const ORDERING_FIELDS: &'static [&'static str] = &["name", "is_active"];

    fn id(model: &TourismType) -> i64 {
        model.id
    }

    fn to_record(model: &TourismType) -> Record {
        Record::new()
            .with("name", FieldValue::Text(Some(model.name.clone())))
            .with("description", FieldValue::Text(model.description.clone()))
            .with("is_active", FieldValue::Bool(model.is_active))
    }

    fn from_create(dto: TourismTypeInputDto) -> Result<Record, FieldErrors> {
        let mut errors = FieldErrors::default();
        let name = require(&mut errors, "name", dto.name);
        errors.into_result()?;

        Ok(Record::new()
            .with("name", FieldValue::Text(name))
            .with("description", FieldValue::Text(dto.description))
            .with("is_active", FieldValue::Bool(dto.is_active.unwrap_or(true))))
    }

    fn apply_update(record: &mut Record, dto: TourismTypeInputDto) {
        if let Some(name) = dto.name {
            record.set("name", FieldValue::Text(Some(name)));
        }
        if let Some(description) = dto.description {
            record.set("description", FieldValue::Text(Some(description)));
        }
        if let Some(is_active) = dto.is_active {
            record.set("is_active", FieldValue::Bool(is_active));
        }
    }
}
