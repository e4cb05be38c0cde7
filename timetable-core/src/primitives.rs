//! Primitive model
//!
//! Turns the vendor's raw `textList` / `boxList` records into typed
//! [`TextFragment`] and [`RenderBox`] values. Records are parsed one at a
//! time so a failure names the offending list and index. Every field is
//! required; nothing is defaulted.

use crate::error::{ReconstructError, ReconstructResult, RecordKind};
use crate::source::RenderData;
use crate::types::*;
use serde::Deserialize;
use serde_json::Value;

/// Wire shape of a `textList` record
#[derive(Debug, Deserialize)]
struct RawText {
    x: i32,
    y: i32,
    fcolor: String,
    fontsize: f64,
    id: i64,
    text: String,
}

/// Wire shape of a `boxList` record
#[derive(Debug, Deserialize)]
struct RawBox {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    bcolor: String,
    fcolor: String,
    id: i64,
    #[serde(rename = "type")]
    kind: String,
}

impl From<RawText> for TextFragment {
    fn from(raw: RawText) -> Self {
        Self {
            x: raw.x,
            y: raw.y,
            font_size: raw.fontsize,
            color: raw.fcolor,
            content: raw.text,
            id: raw.id,
        }
    }
}

impl From<RawBox> for RenderBox {
    fn from(raw: RawBox) -> Self {
        Self {
            x: raw.x,
            y: raw.y,
            width: raw.width,
            height: raw.height,
            border_color: raw.fcolor,
            fill_color: raw.bcolor,
            id: raw.id,
            kind: raw.kind,
        }
    }
}

/// Parse both primitive lists of a render. Output order matches input order.
pub fn parse_primitives(data: &RenderData) -> ReconstructResult<Primitives> {
    let texts = parse_text_records(&data.text_list)?;
    let boxes = parse_box_records(&data.box_list)?;
    log::debug!(
        "Parsed {} text fragments and {} boxes",
        texts.len(),
        boxes.len()
    );
    Ok(Primitives { texts, boxes })
}

pub fn parse_text_records(records: &[Value]) -> ReconstructResult<Vec<TextFragment>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| parse_record::<RawText, _>(RecordKind::Text, index, record))
        .collect()
}

pub fn parse_box_records(records: &[Value]) -> ReconstructResult<Vec<RenderBox>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| parse_record::<RawBox, _>(RecordKind::Box, index, record))
        .collect()
}

fn parse_record<'a, R, T>(kind: RecordKind, index: usize, record: &'a Value) -> ReconstructResult<T>
where
    R: Deserialize<'a>,
    T: From<R>,
{
    R::deserialize(record)
        .map(T::from)
        .map_err(|e| ReconstructError::MalformedRecord {
            kind,
            index,
            reason: e.to_string(),
        })
}
