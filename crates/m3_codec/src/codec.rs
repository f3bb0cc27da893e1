//! Byte level encoding of fixed-width field kinds

use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use std::io::{Cursor, Read, Write};

use crate::error::{Error, Result};
use crate::registry::{FieldKind, IndexWidth};
use crate::types::{RawReference, Tag};
use crate::value::{Bounds, Value};

const FIXED16_SCALE: f32 = 2048.0;

fn read_f32s<const N: usize>(input: &mut impl Read) -> Result<[f32; N]> {
    let mut out = [0.0; N];
    for v in out.iter_mut() {
        *v = input.read_f32::<LE>()?;
    }
    Ok(out)
}

fn write_f32s(output: &mut impl Write, values: &[f32]) -> Result<()> {
    for v in values {
        output.write_f32::<LE>(*v)?;
    }
    Ok(())
}

fn read_bounds(input: &mut impl Read) -> Result<Bounds> {
    Ok(Bounds {
        min: read_f32s(input)?,
        max: read_f32s(input)?,
        radius: input.read_f32::<LE>()?,
    })
}

/// Reads a field that is stored inline and refers to nothing else
pub(crate) fn read_plain(input: &mut Cursor<&[u8]>, kind: FieldKind) -> Result<Value> {
    let value = match kind {
        FieldKind::U8 => Value::U8(input.read_u8()?),
        FieldKind::U16 => Value::U16(input.read_u16::<LE>()?),
        FieldKind::U32 => Value::U32(input.read_u32::<LE>()?),
        FieldKind::I16 => Value::I16(input.read_i16::<LE>()?),
        FieldKind::I32 => Value::I32(input.read_i32::<LE>()?),
        FieldKind::F32 => Value::F32(input.read_f32::<LE>()?),
        FieldKind::Fixed8 => Value::F32(f32::from(input.read_u8()?) / 255.0),
        FieldKind::Fixed16 => Value::F32(f32::from(input.read_i16::<LE>()?) / FIXED16_SCALE),
        FieldKind::Vec2 => Value::Vec2(read_f32s(input)?),
        FieldKind::Vec3 => Value::Vec3(read_f32s(input)?),
        FieldKind::Vec4 => Value::Vec4(read_f32s(input)?),
        FieldKind::Quat => Value::Quat(read_f32s(input)?),
        FieldKind::Color => {
            let mut color = [0; 4];
            input.read_exact(&mut color)?;
            Value::Color(color)
        }
        FieldKind::Matrix => Value::Matrix(read_f32s(input)?),
        FieldKind::Bounds => Value::Bounds(read_bounds(input)?),
        FieldKind::Reserved(size) => {
            let mut bytes = vec![0; size];
            input.read_exact(&mut bytes)?;
            Value::Reserved(bytes)
        }
        other => {
            return Err(Error::CorruptContainer {
                reason: format!("{other:?} is not an inline field"),
            })
        }
    };
    Ok(value)
}

fn int_of(value: &Value) -> Option<i64> {
    match *value {
        Value::U8(v) => Some(v.into()),
        Value::U16(v) => Some(v.into()),
        Value::U32(v) => Some(v.into()),
        Value::I16(v) => Some(v.into()),
        Value::I32(v) => Some(v.into()),
        _ => None,
    }
}

/// Writes a field that is stored inline
///
/// Integer kinds accept any integer variant that fits the width.
pub(crate) fn write_plain(
    output: &mut impl Write,
    tag: Tag,
    field: &str,
    kind: FieldKind,
    value: &Value,
) -> Result<()> {
    let mismatch = || Error::InvalidField {
        tag,
        field: field.to_owned(),
        expected: format!("{kind:?}"),
        found: value.kind_name().to_owned(),
    };
    let int = || int_of(value).ok_or_else(mismatch);

    match (kind, value) {
        (FieldKind::U8, _) => output.write_u8(u8::try_from(int()?).map_err(|_| mismatch())?)?,
        (FieldKind::U16, _) => {
            output.write_u16::<LE>(u16::try_from(int()?).map_err(|_| mismatch())?)?
        }
        (FieldKind::U32, _) => {
            output.write_u32::<LE>(u32::try_from(int()?).map_err(|_| mismatch())?)?
        }
        (FieldKind::I16, _) => {
            output.write_i16::<LE>(i16::try_from(int()?).map_err(|_| mismatch())?)?
        }
        (FieldKind::I32, _) => {
            output.write_i32::<LE>(i32::try_from(int()?).map_err(|_| mismatch())?)?
        }
        (FieldKind::F32, Value::F32(v)) => output.write_f32::<LE>(*v)?,
        (FieldKind::Fixed8, Value::F32(v)) => {
            output.write_u8((v * 255.0).round().clamp(0.0, 255.0) as u8)?
        }
        (FieldKind::Fixed16, Value::F32(v)) => output.write_i16::<LE>(
            (v * FIXED16_SCALE)
                .round()
                .clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16,
        )?,
        (FieldKind::Vec2, Value::Vec2(v)) => write_f32s(output, v)?,
        (FieldKind::Vec3, Value::Vec3(v)) => write_f32s(output, v)?,
        (FieldKind::Vec4, Value::Vec4(v)) => write_f32s(output, v)?,
        (FieldKind::Quat, Value::Quat(v)) => write_f32s(output, v)?,
        (FieldKind::Color, Value::Color(v)) => output.write_all(v)?,
        (FieldKind::Matrix, Value::Matrix(v)) => write_f32s(output, v)?,
        (FieldKind::Bounds, Value::Bounds(b)) => {
            write_f32s(output, &b.min)?;
            write_f32s(output, &b.max)?;
            output.write_f32::<LE>(b.radius)?;
        }
        (FieldKind::Reserved(size), Value::Reserved(bytes)) => {
            let mut padded = bytes.clone();
            padded.resize(size, 0);
            output.write_all(&padded)?;
        }
        _ => return Err(mismatch()),
    }
    Ok(())
}

/// Reads an index, mapping the width's null marker to `None`
pub(crate) fn read_index(input: &mut impl Read, width: IndexWidth) -> Result<Option<u32>> {
    let index = match width {
        IndexWidth::U8 => Some(input.read_u8()?).filter(|v| *v != u8::MAX).map(u32::from),
        IndexWidth::U16 => Some(input.read_u16::<LE>()?)
            .filter(|v| *v != u16::MAX)
            .map(u32::from),
        IndexWidth::U32 => Some(input.read_u32::<LE>()?).filter(|v| *v != u32::MAX),
        IndexWidth::I16 => u32::try_from(input.read_i16::<LE>()?).ok(),
        IndexWidth::I32 => u32::try_from(input.read_i32::<LE>()?).ok(),
    };
    Ok(index)
}

/// Writes an index, using the width's null marker for `None`
///
/// Callers check the index against [`IndexWidth::max_index`] first.
pub(crate) fn write_index(output: &mut impl Write, width: IndexWidth, index: Option<u32>) -> Result<()> {
    match (width, index) {
        (IndexWidth::U8, i) => output.write_u8(i.map_or(u8::MAX, |i| i as u8))?,
        (IndexWidth::U16, i) => output.write_u16::<LE>(i.map_or(u16::MAX, |i| i as u16))?,
        (IndexWidth::U32, i) => output.write_u32::<LE>(i.unwrap_or(u32::MAX))?,
        (IndexWidth::I16, i) => output.write_i16::<LE>(i.map_or(-1, |i| i as i16))?,
        (IndexWidth::I32, i) => output.write_i32::<LE>(i.map_or(-1, |i| i as i32))?,
    }
    Ok(())
}

pub(crate) fn read_reference(input: &mut impl Read) -> Result<RawReference> {
    Ok(RawReference {
        index: input.read_u32::<LE>()?,
        count: input.read_u32::<LE>()?,
        version: input.read_u32::<LE>()?,
    })
}

pub(crate) fn write_reference(output: &mut impl Write, reference: RawReference) -> Result<()> {
    output.write_u32::<LE>(reference.index)?;
    output.write_u32::<LE>(reference.count)?;
    output.write_u32::<LE>(reference.version)?;
    Ok(())
}
