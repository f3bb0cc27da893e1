//! Animation headers and their keyframe sections
//!
//! An animated field is stored inline as a header:
//!
//! | Field         | Size | Notes                                            |
//! |---------------|------|--------------------------------------------------|
//! | interpolation | 2    | see [`Interpolation`]                            |
//! | flags         | 2    |                                                  |
//! | keys          | 12   | reference to `SD**` keyframes, null if constant  |
//! | value         | n    | used when no keyframe applies                    |
//! | hold          | 4    | only from the version the field declares         |
//!
//! Keyframe records are `{ time: i32, value }`.

use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use std::io::{Cursor, Write};
use tracing::debug;

use crate::{
    codec::{read_plain, read_reference, write_plain, write_reference},
    config::Category,
    error::{Error, Result},
    registry::AnimKind,
    resolve::Resolver,
    types::{RawReference, Tag},
    value::{AnimTrack, Interpolation, Keyframe, Value},
};

pub(crate) fn decode_track(
    resolver: &mut Resolver<'_, '_>,
    owner: Tag,
    field: &str,
    kind: AnimKind,
    hold_since: Option<u32>,
    version: u32,
    cursor: &mut Cursor<&[u8]>,
) -> Result<AnimTrack> {
    let interpolation = Interpolation::from(cursor.read_u16::<LE>()?);
    let flags = cursor.read_u16::<LE>()?;
    let keys_ref = read_reference(cursor)?;
    let value = read_plain(cursor, kind.value_kind())?;
    let hold = match hold_since {
        Some(since) if version >= since => Some(cursor.read_f32::<LE>()?),
        _ => None,
    };

    let keys = if interpolation != Interpolation::Constant
        && resolver.import().includes(Category::Animations)
    {
        decode_keys(resolver, owner, field, kind, keys_ref)?
    } else {
        Vec::new()
    };

    Ok(AnimTrack {
        interpolation,
        flags,
        value,
        keys,
        hold,
    })
}

fn decode_keys(
    resolver: &mut Resolver<'_, '_>,
    owner: Tag,
    field: &str,
    kind: AnimKind,
    raw: RawReference,
) -> Result<Vec<Keyframe>> {
    let Value::Records(section) = resolver.reference_value(owner, field, raw, kind.keys_tag())?
    else {
        return Ok(Vec::new());
    };

    section
        .iter()
        .map(|record| {
            let time = match record.get("time") {
                Some(Value::I32(time)) => *time,
                _ => {
                    return Err(Error::CorruptContainer {
                        reason: format!("{owner}.{field} keyframe without a time"),
                    })
                }
            };
            let value = record
                .get("value")
                .cloned()
                .ok_or_else(|| Error::CorruptContainer {
                    reason: format!("{owner}.{field} keyframe without a value"),
                })?;
            Ok(Keyframe { time, value })
        })
        .collect()
}

/// Fails unless keyframe times are strictly ascending
pub fn validate_keys(field: &str, keys: &[Keyframe]) -> Result<()> {
    for (position, pair) in keys.windows(2).enumerate() {
        if pair[1].time <= pair[0].time {
            return Err(Error::InvalidKeyOrder {
                field: field.to_owned(),
                position: position + 1,
                previous: pair[0].time,
                time: pair[1].time,
            });
        }
    }
    Ok(())
}

/// Encodes the records of a keyframe section
pub(crate) fn encode_keys(owner: Tag, field: &str, kind: AnimKind, keys: &[Keyframe]) -> Result<Vec<u8>> {
    validate_keys(&format!("{owner}.{field}"), keys)?;
    let mut out = Vec::new();
    for key in keys {
        out.write_i32::<LE>(key.time)?;
        write_plain(&mut out, kind.keys_tag(), field, kind.value_kind(), &key.value)?;
    }
    Ok(out)
}

/// True when the track needs a keyframe section
pub(crate) fn has_keys(track: &AnimTrack) -> bool {
    track.interpolation != Interpolation::Constant && track.is_animated()
}

/// Writes the inline header of a track
///
/// The hold time is dropped when `version` predates it.
#[allow(clippy::too_many_arguments)]
pub(crate) fn write_header(
    output: &mut impl Write,
    owner: Tag,
    field: &str,
    kind: AnimKind,
    hold_since: Option<u32>,
    version: u32,
    track: &AnimTrack,
    keys: RawReference,
) -> Result<()> {
    if track.interpolation == Interpolation::Constant && track.is_animated() {
        debug!(%owner, field, "constant track keeps no keyframes");
    }
    output.write_u16::<LE>(track.interpolation.into())?;
    output.write_u16::<LE>(track.flags)?;
    write_reference(output, keys)?;
    write_plain(output, owner, field, kind.value_kind(), &track.value)?;

    match hold_since {
        Some(since) if version >= since => output.write_f32::<LE>(track.hold.unwrap_or(0.0))?,
        _ => {
            if track.hold.is_some_and(|hold| hold != 0.0) {
                debug!(%owner, field, version, "hold time not stored by this version");
            }
        }
    }
    Ok(())
}
