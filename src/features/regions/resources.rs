use rust_decimal::Decimal;

use crate::core::store::{FieldValue, OnDelete, Record, Reference};
use crate::features::auth::policy::{Policy, ResourcePolicy};
use crate::features::catalog::query::{FieldKind, FilterField};
use crate::features::catalog::resource::Resource;
use crate::features::regions::dtos::{CityInputDto, ProvinceInputDto};
use crate::features::regions::models::{City, Province};
use crate::shared::validation::{require, with_scale, FieldErrors, COORDINATE_SCALE};

/// Admins add regions; editors may read, update and delete them.
const REGION_POLICY: ResourcePolicy = ResourcePolicy {
    read: Policy::AdminOrEditor,
    write: Policy::AdminOrEditor,
    create: Policy::AdminOnly,
};

pub struct ProvinceResource;

impl Resource for ProvinceResource {
    type Model = Province;
    type CreateDto = ProvinceInputDto;
    type UpdateDto = ProvinceInputDto;

    const TABLE: &'static str = "provinces";
    const PATH: &'static str = "provinces";
    const LABEL: &'static str = "Province";
    const POLICY: ResourcePolicy = REGION_POLICY;
    const FILTER_FIELDS: &'static [FilterField] = &[
        FilterField::new("name", FieldKind::Text),
        FilterField::new("abbreviation", FieldKind::Text),
        FilterField::new("capital_city", FieldKind::Text),
    ];
    const ORDERING_FIELDS: &'static [&'static str] = &["name", "population", "area_km2"];
    const UNIQUE_TOGETHER: &'static [&'static [&'static str]] = &[&["name"]];

    fn id(model: &Province) -> i64 {
        model.id
    }

    fn to_record(model: &Province) -> Record {
        Record::new()
            .with("name", FieldValue::Text(Some(model.name.clone())))
            .with("abbreviation", FieldValue::Text(model.abbreviation.clone()))
            .with("capital_city", FieldValue::Text(model.capital_city.clone()))
            .with("population", FieldValue::Int(model.population))
            .with("area_km2", FieldValue::Float(model.area_km2))
    }

    fn from_create(dto: ProvinceInputDto) -> Result<Record, FieldErrors> {
        let mut errors = FieldErrors::default();
        let name = require(&mut errors, "name", dto.name);
        errors.into_result()?;

        Ok(Record::new()
            .with("name", FieldValue::Text(name))
            .with("abbreviation", FieldValue::Text(dto.abbreviation))
            .with("capital_city", FieldValue::Text(dto.capital_city))
            .with("population", FieldValue::Int(dto.population))
            .with("area_km2", FieldValue::Float(dto.area_km2)))
    }

    fn apply_update(record: &mut Record, dto: ProvinceInputDto) {
        if let Some(name) = dto.name {
            record.set("name", FieldValue::Text(Some(name)));
        }
        if let Some(abbreviation) = dto.abbreviation {
            record.set("abbreviation", FieldValue::Text(Some(abbreviation)));
        }
        if let Some(capital_city) = dto.capital_city {
            record.set("capital_city", FieldValue::Text(Some(capital_city)));
        }
        if let Some(population) = dto.population {
            record.set("population", FieldValue::Int(Some(population)));
        }
        if let Some(area_km2) = dto.area_km2 {
            record.set("area_km2", FieldValue::Float(Some(area_km2)));
        }
    }
}

fn coordinate(value: Decimal) -> Decimal {
    with_scale(value, COORDINATE_SCALE)
}

pub struct CityResource;

impl Resource for CityResource {
    type Model = City;
    type CreateDto = CityInputDto;
    type UpdateDto = CityInputDto;

    const TABLE: &'static str = "cities";
    const PATH: &'static str = "cities";
    const LABEL: &'static str = "City";
    const POLICY: ResourcePolicy = REGION_POLICY;
    const FILTER_FIELDS: &'static [FilterField] = &[
        FilterField::new("name", FieldKind::Text),
        FilterField::new("province", FieldKind::Integer),
        FilterField::new("is_capital", FieldKind::Boolean),
    ];
    const ORDERING_FIELDS: &'static [&'static str] = &["name", "population"];
    const REFERENCES: &'static [Reference] = &[Reference {
        column: "province",
        target: "provinces",
        on_delete: OnDelete::Cascade,
    }];
    const UNIQUE_TOGETHER: &'static [&'static [&'static str]] = &[&["name", "province"]];

    fn id(model: &City) -> i64 {
        model.id
    }

    fn to_record(model: &City) -> Record {
        Record::new()
            .with("name", FieldValue::Text(Some(model.name.clone())))
            .with("province", FieldValue::Int(Some(model.province)))
            .with("is_capital", FieldValue::Bool(model.is_capital))
            .with("area_code", FieldValue::Text(model.area_code.clone()))
            .with("latitude", FieldValue::Decimal(model.latitude))
            .with("longitude", FieldValue::Decimal(model.longitude))
            .with("population", FieldValue::Int(model.population))
    }

    fn from_create(dto: CityInputDto) -> Result<Record, FieldErrors> {
        let mut errors = FieldErrors::default();
        let name = require(&mut errors, "name", dto.name);
        let province = require(&mut errors, "province", dto.province);
        errors.into_result()?;

        Ok(Record::new()
            .with("name", FieldValue::Text(name))
            .with("province", FieldValue::Int(province))
            .with("is_capital", FieldValue::Bool(dto.is_capital.unwrap_or(false)))
            .with("area_code", FieldValue::Text(dto.area_code))
            .with("latitude", FieldValue::Decimal(dto.latitude.map(coordinate)))
            .with("longitude", FieldValue::Decimal(dto.longitude.map(coordinate)))
            .with("population", FieldValue::Int(dto.population)))
    }

    fn apply_update(record: &mut Record, dto: CityInputDto) {
        if let Some(name) = dto.name {
            record.set("name", FieldValue::Text(Some(name)));
        }
        if let Some(province) = dto.province {
            record.set("province", FieldValue::Int(Some(province)));
        }
        if let Some(is_capital) = dto.is_capital {
            record.set("is_capital", FieldValue::Bool(is_capital));
        }
        if let Some(area_code) = dto.area_code {
            record.set("area_code", FieldValue::Text(Some(area_code)));
        }
        if let Some(latitude) = dto.latitude {
            record.set("latitude", FieldValue::Decimal(Some(coordinate(latitude))));
        }
        if let Some(longitude) = dto.longitude {
            record.set("longitude", FieldValue::Decimal(Some(coordinate(longitude))));
        }
        if let Some(population) = dto.population {
            record.set("population", FieldValue::Int(Some(population)));
        }
    }
}
