// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Template model — a base document reference plus an ordered set of typed
// fields, each placed at zero or more positions.
//
// The on-disk catalog shape is loose (missing types, fonts, sizes); it is
// normalised into the strongly typed model here, once, at load time.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::error::{FormwerkError, Result};
use crate::types::GenerationRequest;

const DEFAULT_TEMPLATE_NAME: &str = "Unnamed Template";
const DEFAULT_ICON: &str = "📄";
pub const DEFAULT_FONT: &str = "Helvetica";
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// A named document definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTemplate", into = "RawTemplate")]
pub struct Template {
    pub name: String,
    pub description: String,
    /// Reference to the base document bytes (a file name in the asset store).
    pub source_file: String,
    pub icon: String,
    /// Fields in render and validation order.
    pub fields: Vec<Field>,
}

/// A typed unit of content.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Text(TextField),
    Image(ImageField),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextField {
    pub key: String,
    pub label: String,
    pub required: bool,
    pub default_value: String,
    /// Default font identifier for positions that do not name one.
    pub font: String,
    pub font_size: f32,
    pub positions: Vec<TextPosition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageField {
    pub key: String,
    pub label: String,
    pub required: bool,
    /// Default image file name.
    pub default_value: String,
    pub positions: Vec<ImagePosition>,
}

/// Placement of a text value. Coordinates are PDF points, origin bottom-left.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPosition {
    pub page: u32,
    pub x: f32,
    pub y: f32,
    pub font: Option<String>,
    pub font_size: Option<f32>,
}

/// Placement of an image value, anchored at its lower-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePosition {
    pub page: u32,
    pub x: f32,
    pub y: f32,
    /// Degrees, counter-clockwise.
    pub rotation: f32,
    /// Percent of the native raster size; always > 0.
    pub scale: f32,
}

impl Field {
    pub fn key(&self) -> &str {
        match self {
            Field::Text(f) => &f.key,
            Field::Image(f) => &f.key,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Field::Text(f) => &f.label,
            Field::Image(f) => &f.label,
        }
    }

    pub fn required(&self) -> bool {
        match self {
            Field::Text(f) => f.required,
            Field::Image(f) => f.required,
        }
    }

    pub fn default_value(&self) -> &str {
        match self {
            Field::Text(f) => &f.default_value,
            Field::Image(f) => &f.default_value,
        }
    }

    /// Submitted value if non-blank, else the field default.
    pub fn resolve_value<'a>(&'a self, request: &'a GenerationRequest) -> &'a str {
        request
            .submitted(self.key())
            .unwrap_or_else(|| self.default_value())
    }
}

impl TextField {
    /// Effective font for `position`, inheriting the field default.
    pub fn font_for<'a>(&'a self, position: &'a TextPosition) -> &'a str {
        position
            .font
            .as_deref()
            .filter(|font| !font.is_empty())
            .unwrap_or(&self.font)
    }

    /// Effective font size for `position`, inheriting the field default.
    pub fn font_size_for(&self, position: &TextPosition) -> f32 {
        position.font_size.unwrap_or(self.font_size)
    }
}

impl Template {
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.key() == key)
    }

    /// Messages for every required, visible field without a usable value,
    /// in template order.
    pub fn validate_form_data(&self, request: &GenerationRequest) -> Vec<String> {
        let errors: Vec<String> = self
            .fields
            .iter()
            .filter(|field| request.is_visible(field.key()))
            .filter(|field| field.required() && request.submitted(field.key()).is_none())
            .map(|field| format!("{} (key: {}) is required", field.label(), field.key()))
            .collect();
        if !errors.is_empty() {
            debug!(?errors, "Form validation failed");
        }
        errors
    }

    /// Like [`Template::validate_form_data`] but as a `Result`.
    pub fn validate(&self, request: &GenerationRequest) -> Result<()> {
        let errors = self.validate_form_data(request);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(FormwerkError::Validation(errors))
        }
    }

    /// Parse a single template from its catalog JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// -- Catalog representation ---------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default, alias = "sourceFile")]
    file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
    #[serde(default)]
    fields: RawFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_size: Option<f32>,
    #[serde(default)]
    positions: Vec<RawPosition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPosition {
    #[serde(default)]
    page: u32,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rotation: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scale: Option<f32>,
}

/// JSON object of field key → field, kept in document order.
#[derive(Debug, Clone, Default)]
struct RawFields(Vec<(String, RawField)>);

impl<'de> Deserialize<'de> for RawFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct OrderedFields;

        impl<'de> Visitor<'de> for OrderedFields {
            type Value = RawFields;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field key to field definition")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<RawFields, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, field)) = map.next_entry::<String, RawField>()? {
                    entries.push((key, field));
                }
                Ok(RawFields(entries))
            }
        }

        deserializer.deserialize_map(OrderedFields)
    }
}

impl Serialize for RawFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, field) in &self.0 {
            map.serialize_entry(key, field)?;
        }
        map.end()
    }
}

impl TryFrom<RawTemplate> for Template {
    type Error = FormwerkError;

    fn try_from(raw: RawTemplate) -> Result<Self> {
        let mut fields: Vec<Field> = Vec::with_capacity(raw.fields.0.len());
        for (key, field) in raw.fields.0 {
            if fields.iter().any(|existing| existing.key() == key) {
                return Err(FormwerkError::InvalidTemplate(format!(
                    "duplicate field key '{key}'"
                )));
            }
            fields.push(normalise_field(key, field)?);
        }

        Ok(Self {
            name: raw
                .name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_TEMPLATE_NAME.to_string()),
            description: raw.description,
            source_file: raw.file,
            icon: raw
                .icon
                .filter(|icon| !icon.is_empty())
                .unwrap_or_else(|| DEFAULT_ICON.to_string()),
            fields,
        })
    }
}

fn normalise_field(key: String, raw: RawField) -> Result<Field> {
    let label = raw.label.unwrap_or_else(|| key.clone());
    let default_value = raw.default_value.unwrap_or_default();

    match raw.kind.as_deref().unwrap_or("text") {
        "text" => {
            let positions = raw
                .positions
                .into_iter()
                .map(|pos| TextPosition {
                    page: pos.page,
                    x: pos.x,
                    y: pos.y,
                    font: pos.font.filter(|font| !font.is_empty()),
                    font_size: pos.font_size.filter(|size| *size > 0.0),
                })
                .collect();
            Ok(Field::Text(TextField {
                key,
                label,
                required: raw.required,
                default_value,
                font: raw
                    .font
                    .filter(|font| !font.is_empty())
                    .unwrap_or_else(|| DEFAULT_FONT.to_string()),
                font_size: raw
                    .font_size
                    .filter(|size| *size > 0.0)
                    .unwrap_or(DEFAULT_FONT_SIZE),
                positions,
            }))
        }
        "image" => {
            let mut positions = Vec::with_capacity(raw.positions.len());
            for pos in raw.positions {
                let scale = pos.scale.unwrap_or(100.0);
                if scale <= 0.0 {
                    return Err(FormwerkError::InvalidTemplate(format!(
                        "field '{key}' has non-positive scale {scale}"
                    )));
                }
                positions.push(ImagePosition {
                    page: pos.page,
                    x: pos.x,
                    y: pos.y,
                    rotation: pos.rotation.unwrap_or(0.0),
                    scale,
                });
            }
            Ok(Field::Image(ImageField {
                key,
                label,
                required: raw.required,
                default_value,
                positions,
            }))
        }
        other => Err(FormwerkError::InvalidTemplate(format!(
            "field '{key}' has unknown type '{other}'"
        ))),
    }
}

impl From<Template> for RawTemplate {
    fn from(template: Template) -> Self {
        let fields = template
            .fields
            .into_iter()
            .map(|field| match field {
                Field::Text(text) => (
                    text.key,
                    RawField {
                        label: Some(text.label),
                        kind: Some("text".into()),
                        required: text.required,
                        default_value: Some(text.default_value),
                        font: Some(text.font),
                        font_size: Some(text.font_size),
                        positions: text
                            .positions
                            .into_iter()
                            .map(|pos| RawPosition {
                                page: pos.page,
                                x: pos.x,
                                y: pos.y,
                                font: pos.font,
                                font_size: pos.font_size,
                                ..RawPosition::default()
                            })
                            .collect(),
                    },
                ),
                Field::Image(image) => (
                    image.key,
                    RawField {
                        label: Some(image.label),
                        kind: Some("image".into()),
                        required: image.required,
                        default_value: Some(image.default_value),
                        positions: image
                            .positions
                            .into_iter()
                            .map(|pos| RawPosition {
                                page: pos.page,
                                x: pos.x,
                                y: pos.y,
                                rotation: Some(pos.rotation),
                                scale: Some(pos.scale),
                                ..RawPosition::default()
                            })
                            .collect(),
                        ..RawField::default()
                    },
                ),
            })
            .collect();

        Self {
            name: Some(template.name),
            description: template.description,
            file: template.source_file,
            icon: Some(template.icon),
            fields: RawFields(fields),
        }
    }
}
