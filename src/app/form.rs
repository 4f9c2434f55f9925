//! Listing form shared by the create tab and the edit overlay

use std::path::PathBuf;

use crate::models::{format_price, Turf, TurfDraft, TurfPatch};

/// Which listing the form is for
#[derive(Clone, Debug, PartialEq)]
pub enum FormMode {
    Create,
    /// Holds the listing as it was when editing started
    Edit(Turf),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Name,
    Location,
    Description,
    Price,
    Pitches,
    Image,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Location => "Location",
            FormField::Description => "Description",
            FormField::Price => "Price",
            FormField::Pitches => "Pitches",
            FormField::Image => "Image",
        }
    }
}

const CREATE_FIELDS: &[FormField] = &[
    FormField::Name,
    FormField::Price,
    FormField::Location,
    FormField::Description,
    FormField::Pitches,
    FormField::Image,
];

const EDIT_FIELDS: &[FormField] = &[
    FormField::Name,
    FormField::Price,
    FormField::Location,
    FormField::Description,
    FormField::Pitches,
];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("Price must be a non-negative number")]
    InvalidPrice,
    #[error("Pitches must be a whole number above zero")]
    InvalidPitches,
    #[error("Image not found: {0}")]
    MissingImage(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TurfForm {
    pub mode: FormMode,
    pub name: String,
    pub location: String,
    pub description: String,
    pub price: String,
    pub pitches: String,
    pub image: String,
    pub focus: FormField,
}

impl TurfForm {
    pub fn create() -> Self {
        TurfForm {
            mode: FormMode::Create,
            name: String::new(),
            location: String::new(),
            description: String::new(),
            price: String::new(),
            pitches: String::new(),
            image: String::new(),
            focus: FormField::Name,
        }
    }

    /// Prefilled from an existing listing
    pub fn edit(turf: &Turf) -> Self {
        TurfForm {
            mode: FormMode::Edit(turf.clone()),
            name: turf.name.clone(),
            location: turf.location.clone(),
            description: turf.description.clone(),
            price: format_price(turf.price),
            pitches: turf.number_of_pitches.map(|n| n.to_string()).unwrap_or_default(),
            image: String::new(),
            focus: FormField::Name,
        }
    }

    pub fn title(&self) -> String {
        match &self.mode {
            FormMode::Create => String::from("Create Turf"),
            FormMode::Edit(turf) => format!("Edit #{} {}", turf.id, turf.name),
        }
    }

    pub fn fields(&self) -> &'static [FormField] {
        match self.mode {
            FormMode::Create => CREATE_FIELDS,
            FormMode::Edit(_) => EDIT_FIELDS,
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Location => &self.location,
            FormField::Description => &self.description,
            FormField::Price => &self.price,
            FormField::Pitches => &self.pitches,
            FormField::Image => &self.image,
        }
    }

    fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Location => &mut self.location,
            FormField::Description => &mut self.description,
            FormField::Price => &mut self.price,
            FormField::Pitches => &mut self.pitches,
            FormField::Image => &mut self.image,
        }
    }

    pub fn next_field(&mut self) {
        let fields = self.fields();
        let i = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(i + 1) % fields.len()];
    }

    pub fn prev_field(&mut self) {
        let fields = self.fields();
        let i = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(i + fields.len() - 1) % fields.len()];
    }

    pub fn push_char(&mut self, c: char) {
        match self.focus {
            FormField::Price if !(c.is_ascii_digit() || c == '.') => {}
            FormField::Pitches if !c.is_ascii_digit() => {}
            field => self.value_mut(field).push(c),
        }
    }

    pub fn backspace(&mut self) {
        let field = self.focus;
        self.value_mut(field).pop();
    }

    pub fn clear(&mut self) {
        *self = match &self.mode {
            FormMode::Create => TurfForm::create(),
            FormMode::Edit(turf) => TurfForm::edit(turf),
        };
    }

    /// Validated draft for the create request
    pub fn to_draft(&self) -> Result<TurfDraft, FormError> {
        Ok(TurfDraft {
            name: required(&self.name, FormField::Name)?,
            location: required(&self.location, FormField::Location)?,
            description: required(&self.description, FormField::Description)?,
            price: parse_price(&self.price)?,
            number_of_pitches: parse_pitches(&self.pitches)?,
            image_path: parse_image(&self.image)?,
        })
    }

    /// Patch with the fields that differ from the original listing.
    /// `None` means nothing changed.
    pub fn to_patch(&self) -> Result<Option<TurfPatch>, FormError> {
        let FormMode::Edit(original) = &self.mode else {
            return Ok(None);
        };

        let name = required(&self.name, FormField::Name)?;
        let location = required(&self.location, FormField::Location)?;
        let description = required(&self.description, FormField::Description)?;
        let price = parse_price(&self.price)?;
        let pitches = parse_pitches(&self.pitches)?;

        let patch = TurfPatch {
            id: None,
            name: (name != original.name).then_some(name),
            location: (location != original.location).then_some(location),
            description: (description != original.description).then_some(description),
            image_url: None,
            price: (price != original.price).then_some(price),
            number_of_pitches: pitches.filter(|n| Some(*n) != original.number_of_pitches),
            updated_at: None,
        };

        Ok((!patch.is_empty()).then_some(patch))
    }
}

fn required(value: &str, field: FormField) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FormError::Required(field.label()));
    }
    Ok(value.to_string())
}

fn parse_price(value: &str) -> Result<f64, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FormError::Required(FormField::Price.label()));
    }
    match value.parse::<f64>() {
        Ok(price) if price >= 0.0 && price.is_finite() => Ok(price),
        _ => Err(FormError::InvalidPrice),
    }
}

fn parse_pitches(value: &str) -> Result<Option<u32>, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(FormError::InvalidPitches),
    }
}

/// Resolve `~/` against the home directory and require an existing file
fn parse_image(value: &str) -> Result<Option<PathBuf>, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    let path = match value.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(value)),
        None => PathBuf::from(value),
    };

    if !path.is_file() {
        return Err(FormError::MissingImage(value.to_string()));
    }
    Ok(Some(path))
}
