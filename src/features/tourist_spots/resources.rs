use crate::core::store::{FieldValue, OnDelete, Record, Reference};
use crate::features::auth::policy::{Policy, ResourcePolicy};
use crate::features::catalog::query::{FieldKind, FilterField};
use crate::features::catalog::resource::{Audit, Resource, WriteAction};
use crate::features::tourist_spots::dtos::TouristSpotInputDto;
use crate::features::tourist_spots::models::{SpotStatus, TouristSpot};
use crate::shared::validation::{require, with_scale, FieldErrors, DISTANCE_SCALE};

pub struct TouristSpotResource;

impl Resource for TouristSpotResource {
    type Model = TouristSpot;
    type CreateDto = TouristSpotInputDto;
    type UpdateDto = TouristSpotInputDto;

    const TABLE: &'static str = "tourist_spots";
    const PATH: &'static str = "tourist-spots";
    const LABEL: &'static str = "Tourist spot";
    /// Editors reach create but are turned away by the admin-only re-check.
    const POLICY: ResourcePolicy = ResourcePolicy {
        read: Policy::AdminOrEditor,
        write: Policy::AdminOrEditor,
        create: Policy::AdminOnly,
    };
    const FILTER_FIELDS: &'static [FilterField] = &[
        FilterField::new("name", FieldKind::Text),
        FilterField::new("address", FieldKind::Text),
        FilterField::new("city", FieldKind::Integer),
        FilterField::new("tourism_type", FieldKind::Integer),
        FilterField::new("status", FieldKind::Choice(SpotStatus::CHOICES)),
    ];
    const ORDERING_FIELDS: &'static [&'static str] =
        &["name", "city", "distance_from_city", "created_on"];
    const REFERENCES: &'static [Reference] = &[
        Reference {
            column: "city",
            target: "cities",
            on_delete: OnDelete::Cascade,
        },
        Reference {
            column: "tourism_type",
            target: "tourism_types",
            on_delete: OnDelete::SetNull,
        },
        Reference {
            column: "created_by",
            target: "accounts",
            on_delete: OnDelete::SetNull,
        },
        Reference {
            column: "updated_by",
            target: "accounts",
            on_delete: OnDelete::SetNull,
        },
    ];

    fn id(model: &TouristSpot) -> i64 {
        model.id
    }

    fn to_record(model: &TouristSpot) -> Record {
        Record::new()
            .with("name", FieldValue::Text(Some(model.name.clone())))
            .with("description", FieldValue::Text(model.description.clone()))
            .with("address", FieldValue::Text(Some(model.address.clone())))
            .with("city", FieldValue::Int(Some(model.city)))
            .with("tourism_type", FieldValue::Int(model.tourism_type))
            .with(
                "distance_from_city",
                FieldValue::Decimal(Some(model.distance_from_city)),
            )
            .with("image", FieldValue::Text(model.image.clone()))
            .with(
                "status",
                FieldValue::Text(Some(model.status.as_str().to_string())),
            )
            .with("created_by", FieldValue::Int(model.created_by))
            .with("updated_by", FieldValue::Int(model.updated_by))
            .with("created_on", FieldValue::Timestamp(Some(model.created_on)))
            .with(
                "last_modified",
                FieldValue::Timestamp(Some(model.last_modified)),
            )
    }

    fn from_create(dto: TouristSpotInputDto) -> Result<Record, FieldErrors> {
        let mut errors = FieldErrors::default();
        let name = require(&mut errors, "name", dto.name);
        let address = require(&mut errors, "address", dto.address);
        let city = require(&mut errors, "city", dto.city);
        let distance = require(&mut errors, "distance_from_city", dto.distance_from_city);
        errors.into_result()?;

        let status = dto.status.unwrap_or_default();
        Ok(Record::new()
            .with("name", FieldValue::Text(name))
            .with("description", FieldValue::Text(dto.description))
            .with("address", FieldValue::Text(address))
            .with("city", FieldValue::Int(city))
            .with("tourism_type", FieldValue::Int(dto.tourism_type))
            .with(
                "distance_from_city",
                FieldValue::Decimal(distance.map(|d| with_scale(d, DISTANCE_SCALE))),
            )
            .with("image", FieldValue::Text(dto.image))
            .with("status", FieldValue::Text(Some(status.as_str().to_string()))))
    }

    fn apply_update(record: &mut Record, dto: TouristSpotInputDto) {
        if let Some(name) = dto.name {
            record.set("name", FieldValue::Text(Some(name)));
        }
        if let Some(description) = dto.description {
            record.set("description", FieldValue::Text(Some(description)));
        }
        if let Some(address) = dto.address {
            record.set("address", FieldValue::Text(Some(address)));
        }
        if let Some(city) = dto.city {
            record.set("city", FieldValue::Int(Some(city)));
        }
        if let Some(tourism_type) = dto.tourism_type {
            record.set("tourism_type", FieldValue::Int(Some(tourism_type)));
        }
        if let Some(distance) = dto.distance_from_city {
            record.set(
                "distance_from_city",
                FieldValue::Decimal(Some(with_scale(distance, DISTANCE_SCALE))),
            );
        }
        if let Some(image) = dto.image {
            record.set("image", FieldValue::Text(Some(image)));
        }
        if let Some(status) = dto.status {
            record.set("status", FieldValue::Text(Some(status.as_str().to_string())));
        }
    }

    fn stamp(record: &mut Record, audit: &Audit) {
        let now = FieldValue::Timestamp(Some(audit.at));
        match audit.action {
            WriteAction::Create => {
                record.set("created_by", FieldValue::Int(audit.caller));
                record.set("updated_by", FieldValue::Int(None));
                record.set("created_on", now.clone());
            }
            WriteAction::Update => {
                record.set("updated_by", FieldValue::Int(audit.caller));
            }
        }
        record.set("last_modified", now);
    }
}
