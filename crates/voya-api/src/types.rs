//! Core types for the flight-search chat protocol

use serde::{Deserialize, Serialize};

/// Trip shape requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum TravelType {
    /// One-way
    #[default]
    #[serde(rename = "OW")]
    OneWay,
    /// Round-trip
    #[serde(rename = "RT")]
    RoundTrip,
    /// Open-jaw (return to a different city)
    #[serde(rename = "OJ")]
    OpenJaw,
}

impl TravelType {
    /// Get a human-readable name for this travel type
    pub fn name(&self) -> &'static str {
        match self {
            TravelType::OneWay => "one-way",
            TravelType::RoundTrip => "round-trip",
            TravelType::OpenJaw => "open-jaw",
        }
    }
}

/// Passenger fare category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassengerType {
    #[serde(rename = "ADT")]
    Adult,
    #[serde(rename = "CHD")]
    Child,
    #[serde(rename = "INF")]
    Infant,
}

impl PassengerType {
    /// Get a human-readable name for this passenger type
    pub fn name(&self) -> &'static str {
        match self {
            PassengerType::Adult => "adult",
            PassengerType::Child => "child",
            PassengerType::Infant => "infant",
        }
    }
}

/// Passenger count for one fare category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerInfo {
    #[serde(rename = "type")]
    pub kind: PassengerType,
    pub count: u32,
}

impl PassengerInfo {
    pub fn new(kind: PassengerType, count: u32) -> Self {
        Self { kind, count }
    }
}

/// Airport reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportInfo {
    /// City name
    pub city: String,
    /// IATA three-letter code
    pub code: String,
    /// Airport name
    #[serde(default)]
    pub name: Option<String>,
}

fn default_passengers() -> Vec<PassengerInfo> {
    vec![PassengerInfo::new(PassengerType::Adult, 1)]
}

fn default_cabin_class() -> String {
    "Y".to_string()
}

/// Trip interpretation produced by the backend. The client treats it as
/// opaque pass-through data and replaces its copy wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripInfo {
    pub travel_type: TravelType,
    #[serde(default)]
    pub departure: Option<AirportInfo>,
    #[serde(default)]
    pub arrival: Option<AirportInfo>,
    /// Departure date, yyyy-MM-dd
    #[serde(default)]
    pub dep_date: Option<String>,
    /// Return date, yyyy-MM-dd
    #[serde(default)]
    pub return_date: Option<String>,
    #[serde(default = "default_passengers")]
    pub passengers: Vec<PassengerInfo>,
    /// Cabin class code: Y economy / C business / F first / S premium / ALL
    #[serde(default = "default_cabin_class")]
    pub cabin_class: String,
    #[serde(default)]
    pub cabin_name: Option<String>,
    /// Two-letter airline code, when the user pinned one
    #[serde(default)]
    pub airline_code: Option<String>,
    /// Flight number, `/`-separated for connections
    #[serde(default)]
    pub flight_no: Option<String>,
    /// Requested connection cities (IATA codes)
    #[serde(default)]
    pub transfer_cities: Option<Vec<String>>,
}

impl Default for TripInfo {
    fn default() -> Self {
        Self {
            travel_type: TravelType::OneWay,
            departure: None,
            arrival: None,
            dep_date: None,
            return_date: None,
            passengers: default_passengers(),
            cabin_class: default_cabin_class(),
            cabin_name: None,
            airline_code: None,
            flight_no: None,
            transfer_cities: None,
        }
    }
}

/// One selectable answer to a clarification question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarifyOption {
    /// Display text
    pub label: String,
    /// Machine value echoed back on selection
    pub value: String,
}

/// A backend request for disambiguation before it can complete the turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarifyInfo {
    /// Trip field being clarified
    pub field: String,
    pub question: String,
    pub options: Vec<ClarifyOption>,
}

/// Marketing airline reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirlineRef {
    pub code: String,
    pub name: String,
}

/// Departure or arrival endpoint of a segment. The backend omits keys
/// freely, so every field is defaultable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentEndpoint {
    pub code: String,
    pub city: String,
    pub name: String,
    pub terminal: String,
    /// Local time, yyyy-MM-dd HH:mm:ss
    pub time: String,
}

/// One flight leg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSegment {
    pub sequence: u32,
    pub flight_no: String,
    pub airline: AirlineRef,
    pub departure: SegmentEndpoint,
    pub arrival: SegmentEndpoint,
    /// Flight duration in minutes (stringly typed on the wire)
    pub duration: String,
    /// Aircraft type
    #[serde(default)]
    pub equip: Option<String>,
    #[serde(default)]
    pub is_transfer: bool,
}

/// Price breakdown, stringly typed on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceInfo {
    pub total: String,
    pub base: String,
    pub tax: String,
    pub currency: String,
}

/// One bookable flight product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightInfo {
    pub id: String,
    /// Product type tag, e.g. "INTL_NORMAL"
    #[serde(rename = "type")]
    pub product_type: String,
    #[serde(default)]
    pub travel_type: TravelType,
    pub segments: Vec<FlightSegment>,
    #[serde(default)]
    pub is_transfer: bool,
    pub cabin_class: String,
    #[serde(default)]
    pub cabin_name: Option<String>,
    /// Remaining seats
    #[serde(default)]
    pub cabin_num: Option<String>,
    pub price: PriceInfo,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub labels: Vec<serde_json::Value>,
}

/// Diagnostic payload returned alongside mocked results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugInfo {
    /// Raw outbound mock request
    pub mock_request: Option<serde_json::Value>,
    /// Raw search response
    pub search_response: Option<serde_json::Value>,
}

/// Kind of a terminal backend answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// The backend needs disambiguation before searching
    Clarify,
    /// Search results are attached
    Result,
    /// Search still in progress
    Searching,
    /// Mock data is being generated
    Mocking,
    /// The turn failed server-side
    Error,
}

impl ResponseKind {
    /// Get a human-readable name for this response kind
    pub fn name(&self) -> &'static str {
        match self {
            ResponseKind::Clarify => "clarify",
            ResponseKind::Result => "result",
            ResponseKind::Searching => "searching",
            ResponseKind::Mocking => "mocking",
            ResponseKind::Error => "error",
        }
    }
}

/// Outbound request body for one turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Session id, `None` until the backend assigns one
    pub session_id: Option<String>,
    /// User message text (or the machine value of a selected option)
    pub message: String,
    /// Set when the turn resolves a prior clarification
    pub selected_option: Option<String>,
}

impl ChatRequest {
    /// Build a request, treating an empty session id as unassigned
    pub fn new(
        session_id: impl Into<String>,
        message: impl Into<String>,
        selected_option: Option<String>,
    ) -> Self {
        let session_id = session_id.into();
        Self {
            session_id: (!session_id.is_empty()).then_some(session_id),
            message: message.into(),
            selected_option,
        }
    }
}

/// Fully-buffered response body (non-streaming transport mode). Carries the
/// same semantic fields as a streamed `final` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    pub message: String,
    #[serde(default)]
    pub trip_info: Option<TripInfo>,
    #[serde(default)]
    pub clarify: Option<ClarifyInfo>,
    #[serde(default)]
    pub flights: Vec<FlightInfo>,
    #[serde(default)]
    pub is_mocked: bool,
    #[serde(default)]
    pub debug_info: Option<DebugInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trip_info_defaults() {
        let trip: TripInfo = serde_json::from_str(r#"{"travel_type": "OW"}"#).unwrap();
        assert_eq!(trip.travel_type, TravelType::OneWay);
        assert_eq!(trip.passengers, vec![PassengerInfo::new(PassengerType::Adult, 1)]);
        assert_eq!(trip.cabin_class, "Y");
        assert!(trip.departure.is_none());
    }

    #[test]
    fn test_trip_info_full() {
        let trip: TripInfo = serde_json::from_str(
            r#"{
                "travel_type": "RT",
                "departure": {"city": "Beijing", "code": "PEK"},
                "arrival": {"city": "Shanghai", "code": "SHA", "name": "Hongqiao"},
                "dep_date": "2026-02-24",
                "return_date": "2026-03-01",
                "passengers": [{"type": "ADT", "count": 2}, {"type": "CHD", "count": 1}],
                "cabin_class": "C",
                "transfer_cities": ["CAN"]
            }"#,
        )
        .unwrap();
        assert_eq!(trip.travel_type, TravelType::RoundTrip);
        assert_eq!(trip.departure.unwrap().code, "PEK");
        assert_eq!(trip.arrival.unwrap().name.as_deref(), Some("Hongqiao"));
        assert_eq!(trip.passengers.len(), 2);
        assert_eq!(trip.passengers[1].kind, PassengerType::Child);
        assert_eq!(trip.transfer_cities.unwrap(), vec!["CAN"]);
    }

    #[test]
    fn test_flight_info_backend_shape() {
        // Extra keys (cabin_name, labels, passenger price breakdown) must not
        // break deserialization.
        let flight: FlightInfo = serde_json::from_str(
            r#"{
                "id": "CA1501",
                "type": "INTL_NORMAL",
                "travel_type": "OW",
                "segments": [{
                    "sequence": 1,
                    "flight_no": "CA1501",
                    "airline": {"code": "CA", "name": "Air China"},
                    "departure": {"code": "PEK", "city": "BJS", "name": "PEK", "terminal": "T3", "time": "2026-02-24 12:00:00"},
                    "arrival": {"code": "SHA", "city": "SHA", "name": "SHA", "terminal": "T2", "time": "2026-02-24 14:10:00"},
                    "duration": "130",
                    "equip": "",
                    "is_transfer": false
                }],
                "is_transfer": false,
                "cabin_class": "Y",
                "cabin_name": "Economy",
                "cabin_num": "9",
                "price": {"total": "1224", "base": "860", "tax": "364", "currency": "CNY", "passengers": []},
                "services": [],
                "labels": []
            }"#,
        )
        .unwrap();
        assert_eq!(flight.segments.len(), 1);
        assert_eq!(flight.segments[0].airline.code, "CA");
        assert_eq!(flight.price.total, "1224");
        assert_eq!(flight.cabin_num.as_deref(), Some("9"));
    }

    #[test]
    fn test_chat_request_empty_session_id() {
        let request = ChatRequest::new("", "hello", None);
        assert_eq!(request.session_id, None);

        let request = ChatRequest::new("s1", "Y", Some("Y".to_string()));
        assert_eq!(request.session_id.as_deref(), Some("s1"));
        assert_eq!(request.selected_option.as_deref(), Some("Y"));
    }

    #[test]
    fn test_response_kind_wire_names() {
        assert_eq!(serde_json::to_string(&ResponseKind::Clarify).unwrap(), "\"clarify\"");
        assert_eq!(serde_json::to_string(&ResponseKind::Result).unwrap(), "\"result\"");
        let kind: ResponseKind = serde_json::from_str("\"mocking\"").unwrap();
        assert_eq!(kind, ResponseKind::Mocking);
    }

    #[test]
    fn test_chat_response_minimal() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"session_id": "s1", "type": "searching", "message": "still looking"}"#,
        )
        .unwrap();
        assert_eq!(response.kind, ResponseKind::Searching);
        assert!(response.flights.is_empty());
        assert!(!response.is_mocked);
        assert!(response.debug_info.is_none());
    }
}
