use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::TransportError;

/// Device state as reported by `GET /json/state`.
///
/// Only the fields the controller reasons about are typed, everything else
/// is kept in `extra` so the document serializes back without loss.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    #[serde(default)]
    pub on: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,
    #[serde(default, deserialize_with = "segments")]
    pub seg: Vec<Segment>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of `state.seg`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default)]
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fx: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pal: Option<usize>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Some firmwares wrap the segment list in another object: `"seg": {"seg": [...]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonSegments {
    List(Vec<Segment>),
    Nested {
        #[serde(default)]
        seg: Vec<Segment>,
    },
}

fn segments<'de, D>(deserializer: D) -> Result<Vec<Segment>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<JsonSegments>::deserialize(deserializer)? {
        Some(JsonSegments::List(seg)) | Some(JsonSegments::Nested { seg }) => seg,
        None => Vec::new(),
    })
}

impl DeviceState {
    /// Parse a raw `/json/state` document.
    pub fn from_json(url: &str, value: Value) -> Result<Self, TransportError> {
        serde_json::from_value(value).map_err(|source| TransportError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Segment with the given id, else the first segment, else `None`.
    pub fn segment(&self, id: u32) -> Option<&Segment> {
        self.seg
            .iter()
            .find(|segment| segment.id == id)
            .or_else(|| self.seg.first())
    }

    /// Whether the device is on and `segment_id` already runs `fx` with `pal`.
    pub fn is_showing(&self, segment_id: u32, fx: usize, pal: usize) -> bool {
        self.on
            && self
                .segment(segment_id)
                .map_or(false, |s| s.fx == Some(fx) && s.pal == Some(pal))
    }
}

/// Body of `POST /json/state`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatePayload {
    pub on: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub seg: Vec<SegmentPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentPayload {
    pub id: u32,
    pub on: bool,
    pub fx: usize,
    pub pal: usize,
}

impl StatePayload {
    /// Turn the device on and run effect `fx` with palette `pal` on one segment.
    pub fn effect(bri: u8, transition: u32, segment_id: u32, fx: usize, pal: usize) -> Self {
        StatePayload {
            on: true,
            bri: Some(bri),
            transition: Some(transition),
            seg: vec![SegmentPayload {
                id: segment_id,
                on: true,
                fx,
                pal,
            }],
        }
    }

    /// `{"on": false}`
    pub fn off() -> Self {
        StatePayload {
            on: false,
            bri: None,
            transition: None,
            seg: Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<Value, TransportError> {
        serde_json::to_value(self).map_err(TransportError::Encode)
    }
}
