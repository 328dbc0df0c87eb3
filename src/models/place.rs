// src/models/place.rs
// DOCUMENTATION: Core data structures for offered places
// PURPOSE: Domain entity, wire payload and validated inputs for create/update

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use crate::errors::PlacesError;

/// Geographic location of a place
/// DOCUMENTATION: Shared by the domain entity and the wire payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceLocation {
    pub lat: f64,
    pub lng: f64,

    /// Human readable address label
    pub address: String,

    /// Pre-rendered map snapshot, if the picker produced one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_map_image_url: Option<String>,
}

impl PlaceLocation {
    fn check_coordinates(&self) -> Result<(), String> {
        if !(-90.0..=90.0).contains(&self.lat) || !(-180.0..=180.0).contains(&self.lng) {
            return Err(format!(
                "coordinates out of range: lat={}, lng={}",
                self.lat, self.lng
            ));
        }
        Ok(())
    }
}

/// A bookable place known to the client
/// DOCUMENTATION: Only ever built from a server-confirmed id, so `id`
/// is always the remote key of the record
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    /// Remote key (assigned by the backend on creation)
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,

    /// Price per night, always positive
    pub price: f64,

    /// Availability window, `available_from <= available_to`
    pub available_from: DateTime<Utc>,
    pub available_to: DateTime<Utc>,

    /// Owning user
    pub user_id: String,
    pub location: PlaceLocation,
}

/// Entity payload as stored remotely under `offered-places/{id}`
/// DOCUMENTATION: The id is the record key and never part of the body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceData {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub price: f64,
    pub available_from: String,
    pub available_to: String,
    pub user_id: String,
    pub location: PlaceLocation,
}

impl PlaceData {
    /// Record rules shared by the payload mapper and outgoing writes
    /// Returns the parsed availability window.
    pub fn check(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), String> {
        check_title(&self.title)?;
        if self.user_id.trim().is_empty() {
            return Err("missing userId".to_string());
        }

        let available_from = parse_wire_date(&self.available_from)
            .ok_or_else(|| format!("unparsable availableFrom '{}'", self.available_from))?;
        let available_to = parse_wire_date(&self.available_to)
            .ok_or_else(|| format!("unparsable availableTo '{}'", self.available_to))?;

        check_window(&available_from, &available_to)?;
        check_price(self.price)?;
        self.location.check_coordinates()?;
        Ok((available_from, available_to))
    }
}

/// Parse a wire date
/// Accepts full RFC 3339 timestamps and plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_wire_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Format a date the way the backend stores it (`2021-01-01T00:00:00.000Z`)
pub fn format_wire_date(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn check_price(price: f64) -> Result<(), String> {
    if !price.is_finite() || price <= 0.0 {
        return Err(format!("price must be a positive number, got {}", price));
    }
    Ok(())
}

fn check_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("missing title".to_string());
    }
    Ok(())
}

fn check_window(from: &DateTime<Utc>, to: &DateTime<Utc>) -> Result<(), String> {
    if from > to {
        return Err(format!(
            "availability window ends before it starts ({} > {})",
            format_wire_date(from),
            format_wire_date(to)
        ));
    }
    Ok(())
}

impl Place {
    /// Build a place from a remote record
    /// DOCUMENTATION: Full field validation. Dates must parse, the window must
    /// be ordered, the price positive. Any violation rejects the record.
    pub fn from_payload(id: &str, data: PlaceData) -> Result<Self, PlacesError> {
        if id.trim().is_empty() {
            return Err(PlacesError::InvalidPayload("record with empty id".to_string()));
        }

        let (available_from, available_to) = data
            .check()
            .map_err(|msg| PlacesError::InvalidPayload(format!("place {}: {}", id, msg)))?;

        Ok(Place {
            id: id.to_string(),
            title: data.title,
            description: data.description,
            image_url: data.image_url,
            price: data.price,
            available_from,
            available_to,
            user_id: data.user_id,
            location: data.location,
        })
    }

    /// Convert to the body sent on PUT
    pub fn to_payload(&self) -> PlaceData {
        PlaceData {
            title: self.title.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            price: self.price,
            available_from: format_wire_date(&self.available_from),
            available_to: format_wire_date(&self.available_to),
            user_id: self.user_id.clone(),
            location: self.location.clone(),
        }
    }

    /// Copy of this place with the editable fields replaced
    /// Image, availability window, owner and location are kept.
    pub fn with_edit(&self, edit: &PlaceEdit) -> Place {
        Place {
            title: edit.title.clone(),
            description: edit.description.clone(),
            price: edit.price,
            ..self.clone()
        }
    }
}

fn schema_error(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::from(message));
    error
}

/// Input for creating a place
/// DOCUMENTATION: Validated before any network call is attempted
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_new_place"))]
pub struct NewPlace {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[validate(length(min = 1, max = 180))]
    pub description: String,

    pub price: f64,
    pub available_from: DateTime<Utc>,
    pub available_to: DateTime<Utc>,
    pub location: PlaceLocation,

    /// Reference returned by a previous image upload
    #[validate(length(min = 1))]
    pub image_url: String,
}

fn validate_new_place(place: &NewPlace) -> Result<(), ValidationError> {
    check_title(&place.title).map_err(|msg| schema_error("title", msg))?;
    check_price(place.price).map_err(|msg| schema_error("price", msg))?;
    check_window(&place.available_from, &place.available_to)
        .map_err(|msg| schema_error("availability", msg))?;
    place
        .location
        .check_coordinates()
        .map_err(|msg| schema_error("location", msg))?;
    Ok(())
}

impl NewPlace {
    /// Payload for POST, owned by `user_id`
    pub fn to_payload(&self, user_id: &str) -> PlaceData {
        PlaceData {
            title: self.title.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            price: self.price,
            available_from: format_wire_date(&self.available_from),
            available_to: format_wire_date(&self.available_to),
            user_id: user_id.to_string(),
            location: self.location.clone(),
        }
    }
}

/// Editable fields of an existing place
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_place_edit"))]
pub struct PlaceEdit {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[validate(length(min = 1, max = 180))]
    pub description: String,

    pub price: f64,
}

fn validate_place_edit(edit: &PlaceEdit) -> Result<(), ValidationError> {
    check_title(&edit.title).map_err(|msg| schema_error("title", msg))?;
    check_price(edit.price).map_err(|msg| schema_error("price", msg))
}

impl PlaceEdit {
    pub fn new(title: impl Into<String>, description: impl Into<String>, price: f64) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data() -> PlaceData {
        PlaceData {
            title: "Manhattan Mansion".to_string(),
            description: "In the Heart of New York City".to_string(),
            image_url: "https://example.com/manhattan.jpg".to_string(),
            price: 149.0,
            available_from: "2021-01-01T00:00:00.000Z".to_string(),
            available_to: "2021-12-31T00:00:00.000Z".to_string(),
            user_id: "abc".to_string(),
            location: PlaceLocation {
                lat: 40.7831,
                lng: -73.9712,
                address: "Manhattan, New York".to_string(),
                static_map_image_url: None,
            },
        }
    }

    #[test]
    fn test_from_payload_parses_dates() {
        let place = Place::from_payload("p1", sample_data()).unwrap();

        assert_eq!(place.id, "p1");
        assert_eq!(place.price, 149.0);
        assert_eq!(format_wire_date(&place.available_from), "2021-01-01T00:00:00.000Z");
        assert!(place.available_from <= place.available_to);
    }

    #[test]
    fn test_plain_dates_are_accepted() {
        let mut data = sample_data();
        data.available_from = "2021-01-01".to_string();
        data.available_to = "2021-01-01".to_string();

        let place = Place::from_payload("p1", data).unwrap();
        assert_eq!(place.available_from, place.available_to);
    }

    #[test]
    fn test_from_payload_rejects_bad_records() {
        let mut bad_date = sample_data();
        bad_date.available_to = "next tuesday".to_string();
        assert!(matches!(
            Place::from_payload("p1", bad_date),
            Err(PlacesError::InvalidPayload(_))
        ));

        let mut reversed = sample_data();
        reversed.available_from = "2022-01-01".to_string();
        assert!(Place::from_payload("p1", reversed).is_err());

        let mut free = sample_data();
        free.price = 0.0;
        assert!(Place::from_payload("p1", free).is_err());

        assert!(Place::from_payload("", sample_data()).is_err());
    }

    #[test]
    fn test_missing_field_fails_to_deserialize() {
        let json = serde_json::json!({
            "title": "No price",
            "description": "",
            "imageUrl": "x",
            "availableFrom": "2021-01-01",
            "availableTo": "2021-01-02",
            "userId": "abc",
            "location": { "lat": 1.0, "lng": 2.0, "address": "here" }
        });

        assert!(serde_json::from_value::<PlaceData>(json).is_err());
    }

    #[test]
    fn test_payload_uses_camel_case_and_no_id() {
        let place = Place::from_payload("p1", sample_data()).unwrap();
        let json = serde_json::to_value(place.to_payload()).unwrap();

        assert_eq!(json["imageUrl"], "https://example.com/manhattan.jpg");
        assert_eq!(json["availableFrom"], "2021-01-01T00:00:00.000Z");
        assert_eq!(json["userId"], "abc");
        assert!(json.get("id").is_none());
        assert!(json["location"].get("staticMapImageUrl").is_none());
    }

    #[test]
    fn test_with_edit_keeps_untouched_fields() {
        let place = Place::from_payload("p1", sample_data()).unwrap();
        let updated = place.with_edit(&PlaceEdit::new("New Title", "New Desc", 150.0));

        assert_eq!(updated.id, "p1");
        assert_eq!(updated.title, "New Title");
        assert_eq!(updated.description, "New Desc");
        assert_eq!(updated.price, 150.0);
        assert_eq!(updated.image_url, place.image_url);
        assert_eq!(updated.available_from, place.available_from);
        assert_eq!(updated.available_to, place.available_to);
        assert_eq!(updated.user_id, place.user_id);
        assert_eq!(updated.location, place.location);
    }

    #[test]
    fn test_new_place_validation() {
        let from = parse_wire_date("2024-05-01").unwrap();
        let to = parse_wire_date("2024-05-31").unwrap();
        let mut new_place = NewPlace {
            title: "Paris Place".to_string(),
            description: "A romantic place in Paris".to_string(),
            price: 199.99,
            available_from: from,
            available_to: to,
            location: sample_data().location,
            image_url: "https://example.com/paris.jpg".to_string(),
        };
        assert!(new_place.validate().is_ok());

        new_place.description = "x".repeat(181);
        assert!(new_place.validate().is_err());

        new_place.description = "ok".to_string();
        new_place.available_from = to;
        new_place.available_to = from;
        assert!(new_place.validate().is_err());
    }

    #[test]
    fn test_blank_title_rejected_locally_and_on_the_wire() {
        let new_place = NewPlace {
            title: "   ".to_string(),
            description: "Whitespace only title".to_string(),
            price: 50.0,
            available_from: parse_wire_date("2024-05-01").unwrap(),
            available_to: parse_wire_date("2024-05-31").unwrap(),
            location: sample_data().location,
            image_url: "https://example.com/blank.jpg".to_string(),
        };
        let errors = new_place.validate().unwrap_err();
        assert!(errors.to_string().contains("missing title"));

        let payload = new_place.to_payload("abc");
        assert!(payload.check().is_err());
        assert!(matches!(
            Place::from_payload("p1", payload),
            Err(PlacesError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_outgoing_payload_needs_owner() {
        let mut data = sample_data();
        assert!(data.check().is_ok());

        data.user_id = " ".to_string();
        assert_eq!(data.check().unwrap_err(), "missing userId");
    }

    #[test]
    fn test_place_edit_validation() {
        assert!(PlaceEdit::new("Title", "Desc", 10.0).validate().is_ok());
        assert!(PlaceEdit::new("", "Desc", 10.0).validate().is_err());
        assert!(PlaceEdit::new(" \t ", "Desc", 10.0).validate().is_err());
        assert!(PlaceEdit::new("Title", "Desc", -1.0).validate().is_err());
        assert!(PlaceEdit::new("Title", "Desc", f64::NAN).validate().is_err());
    }
}
